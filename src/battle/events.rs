use crate::battle::fighter::{Fighter, Side};
use schema::Effectiveness;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BattleEvent {
    BattleStarted,
    TurnStarted {
        turn_number: u32,
    },
    Attacked {
        attacker: Side,
    },
    AttackEffectiveness {
        effectiveness: Effectiveness,
    },
    DamageDealt {
        target: Side,
        damage: u32,
        remaining_hp: i64,
    },
    BattleEnded {
        winner: Side,
    },
}

impl BattleEvent {
    /// Formats the event into a log line using the two fighters as context.
    /// Returns None for silent events that should not produce user-visible text.
    pub fn format(&self, fighters: &[Fighter; 2]) -> Option<String> {
        let name = |side: Side| fighters[side.index()].name.as_str();

        match self {
            BattleEvent::BattleStarted => {
                let [a, b] = fighters;
                Some(format!(
                    "战斗开始！「{}」(Lv.{} {}系) vs 「{}」(Lv.{} {}系)",
                    a.name, a.level, a.attribute, b.name, b.level, b.attribute
                ))
            }
            BattleEvent::TurnStarted { turn_number } => {
                Some(format!("--- 第 {} 回合 ---", turn_number))
            }
            BattleEvent::Attacked { attacker } => match attacker {
                Side::Challenger => Some(format!("「{}」发起了攻击！", name(*attacker))),
                Side::Defender => Some(format!("「{}」进行了反击！", name(*attacker))),
            },
            BattleEvent::AttackEffectiveness { effectiveness } => match effectiveness {
                Effectiveness::Advantaged => Some("效果拔群！".to_string()),
                Effectiveness::Disadvantaged => Some("效果不太理想…".to_string()),
                Effectiveness::Neutral => None,
            },
            BattleEvent::DamageDealt {
                target,
                damage,
                remaining_hp,
            } => Some(format!(
                "对「{}」造成了 {} 点伤害！(剩余HP: {})",
                name(*target),
                damage,
                (*remaining_hp).max(0)
            )),
            BattleEvent::BattleEnded { winner } => {
                Some(format!("战斗结束！胜利者是「{}」！", name(*winner)))
            }
        }
    }
}
