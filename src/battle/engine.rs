//! Turn-based fight resolution between two fighter snapshots.
//!
//! The challenger strikes first every turn. A blow that drops the defender to
//! zero ends the fight at once, so the defender never gets a last counter-hit.
//! Hits are applied one at a time, so exactly one side is left standing.

use crate::battle::events::BattleEvent;
use crate::battle::fighter::{Fighter, Side};
use crate::rng::GameRng;
use schema::{Attribute, Effectiveness};

const VARIANCE_LOW: f64 = 0.8;
const VARIANCE_HIGH: f64 = 1.2;
const DEFENSE_WEIGHT: f64 = 0.5;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BattleOutcome {
    pub fighters: [Fighter; 2],
    pub events: Vec<BattleEvent>,
    pub winner: Side,
    pub turns: u32,
    pub remaining_hp: [i64; 2],
}

impl BattleOutcome {
    pub fn winner_name(&self) -> &str {
        &self.fighters[self.winner.index()].name
    }

    pub fn loser(&self) -> Side {
        self.winner.opponent()
    }

    /// The human-readable battle log, one line per visible event.
    pub fn log(&self) -> Vec<String> {
        self.events
            .iter()
            .filter_map(|event| event.format(&self.fighters))
            .collect()
    }
}

/// Damage of one blow: max(1, floor(attack × U(0.8, 1.2) − defense × 0.5)),
/// then scaled by attribute effectiveness and floored again.
pub fn calculate_damage(
    attacker: &Fighter,
    defender: &Fighter,
    rng: &mut GameRng,
) -> (u32, Effectiveness) {
    let variance = rng.factor(VARIANCE_LOW, VARIANCE_HIGH, "damage variance");
    let raw = (attacker.attack as f64 * variance - defender.defense as f64 * DEFENSE_WEIGHT)
        .floor()
        .max(1.0) as u32;
    let effectiveness = Attribute::effectiveness(attacker.attribute, defender.attribute);
    (effectiveness.apply(raw), effectiveness)
}

fn strike(
    attacker: Side,
    fighters: &[Fighter; 2],
    hp: &mut [i64; 2],
    events: &mut Vec<BattleEvent>,
    rng: &mut GameRng,
) -> bool {
    let target = attacker.opponent();
    let (damage, effectiveness) =
        calculate_damage(&fighters[attacker.index()], &fighters[target.index()], rng);
    hp[target.index()] -= damage as i64;

    events.push(BattleEvent::Attacked { attacker });
    events.push(BattleEvent::AttackEffectiveness { effectiveness });
    events.push(BattleEvent::DamageDealt {
        target,
        damage,
        remaining_hp: hp[target.index()],
    });

    hp[target.index()] <= 0
}

/// Fights `challenger` against `defender` until one of them drops to zero HP.
pub fn resolve(challenger: &Fighter, defender: &Fighter, rng: &mut GameRng) -> BattleOutcome {
    let fighters = [challenger.clone(), defender.clone()];
    let mut hp = [challenger.max_hp(), defender.max_hp()];
    let mut events = vec![BattleEvent::BattleStarted];
    let mut turns = 0;

    let winner = loop {
        // A fighter may already be down (e.g. level 0 and no satiety in a hand-built snapshot).
        if hp[Side::Defender.index()] <= 0 {
            break Side::Challenger;
        }
        if hp[Side::Challenger.index()] <= 0 {
            break Side::Defender;
        }

        turns += 1;
        events.push(BattleEvent::TurnStarted { turn_number: turns });

        if strike(Side::Challenger, &fighters, &mut hp, &mut events, rng) {
            break Side::Challenger;
        }
        if strike(Side::Defender, &fighters, &mut hp, &mut events, rng) {
            break Side::Defender;
        }
    };

    events.push(BattleEvent::BattleEnded { winner });
    tracing::debug!(
        challenger = %fighters[0].name,
        defender = %fighters[1].name,
        ?winner,
        turns,
        "battle resolved"
    );

    BattleOutcome {
        fighters,
        events,
        winner,
        turns,
        remaining_hp: hp,
    }
}
