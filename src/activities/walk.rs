//! Walking: a random discovery most of the time, otherwise a fight with a wild pet.

use crate::battle::{self, BattleOutcome, Fighter, Side};
use crate::catalog::Catalog;
use crate::config::EngineConfig;
use crate::errors::{Activity, CooldownSubject, PetError, PetResult, StorageError};
use crate::game::{observe, species_of, PetGame};
use crate::pet::{PetKey, PetRecord};
use crate::progression::{check_level_up, LevelUp};
use crate::rng::GameRng;
use crate::store::PetStore;
use chrono::{DateTime, Utc};
use std::fmt;

const DISCOVERY_AMOUNT: (u32, u32) = (5, 20);
const DISCOVERY_MONEY: (u32, u32) = (1, 10);
const WILD_LEVEL_SPREAD: (i64, i64) = (-1, 1);
const VICTORY_EXP_PER_LEVEL: u64 = 5;
const VICTORY_EXP_BONUS: (u32, u32) = (1, 5);
const VICTORY_MONEY: (u32, u32) = (5, 15);
const CONSOLATION_EXP: u64 = 1;

const REWARD_KINDS: [RewardKind; 3] = [
    RewardKind::Experience,
    RewardKind::Mood,
    RewardKind::Satiety,
];

// Each line follows the pet's name.
const DISCOVERIES: [&str; 5] = [
    "在草丛中发现了一些闪闪发光的道具，心情大好！",
    "遇到了友善的NPC，获得了一些经验和金钱。",
    "在小溪边喝了些水，感觉饱食度增加了。",
    "在花丛中打了个滚，心情变得很好。",
    "找到了一个隐藏的宝箱，里面有一些奖励！",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RewardKind {
    Experience,
    Mood,
    Satiety,
}

impl fmt::Display for RewardKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let display_name = match self {
            RewardKind::Experience => "经验值",
            RewardKind::Mood => "心情值",
            RewardKind::Satiety => "饱食度",
        };
        write!(f, "{}", display_name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WalkEvent {
    /// A random find. `amount` is what was rolled; mood and satiety are still capped.
    Discovery {
        story: String,
        reward: RewardKind,
        amount: u32,
        money: u64,
    },
    Encounter {
        battle: BattleOutcome,
        won: bool,
        experience: u64,
        money: u64,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalkOutcome {
    pub record: PetRecord,
    pub event: WalkEvent,
    pub level_ups: Vec<LevelUp>,
}

impl WalkOutcome {
    pub fn messages(&self) -> Vec<String> {
        let mut lines = Vec::new();
        match &self.event {
            WalkEvent::Discovery {
                story,
                reward,
                amount,
                money,
            } => {
                lines.push(format!(
                    "奇遇发生！\n{}\n你的宠物获得了 {} 点{}！",
                    story, amount, reward
                ));
                if *money > 0 {
                    lines.push(format!("意外之喜！你在路边捡到了 ${}！", money));
                }
            }
            WalkEvent::Encounter {
                battle,
                won,
                experience,
                money,
            } => {
                lines.extend(battle.log());
                if *won {
                    lines.push(format!(
                        "胜利了！你获得了 {} 点经验值和 ${} 赏金！",
                        experience, money
                    ));
                } else {
                    lines.push(format!(
                        "很遗憾，你的宠物战败了，但也获得了 {} 点经验。",
                        experience
                    ));
                }
            }
        }
        lines.extend(self.level_ups.iter().map(|level_up| level_up.to_string()));
        lines
    }
}

impl<S: PetStore> PetGame<S> {
    pub fn walk(
        &self,
        key: &PetKey,
        rng: &mut GameRng,
        now: DateTime<Utc>,
    ) -> PetResult<WalkOutcome> {
        self.settle(key, now)?;
        let outcome = self.store().transaction(|tx| {
            let record = observe(tx, key, now, self.config())?.record;
            let outcome = take_walk(record, self.catalog(), self.config(), rng, now)?;
            tx.put_pet(outcome.record.clone())?;
            Ok(outcome)
        });

        match &outcome {
            Ok(done) => tracing::info!(
                pet = %key,
                encounter = matches!(done.event, WalkEvent::Encounter { .. }),
                levels = done.level_ups.len(),
                "walk finished"
            ),
            Err(e) if e.is_user_facing() => {
                tracing::debug!(pet = %key, reason = %e, "walk rejected")
            }
            Err(_) => {}
        }
        outcome
    }
}

/// Runs one walk against a record snapshot and returns the updated record.
///
/// Random draws happen in a fixed order: branch, then the branch's rolls,
/// then level-up growth.
pub fn take_walk(
    mut record: PetRecord,
    catalog: &Catalog,
    config: &EngineConfig,
    rng: &mut GameRng,
    now: DateTime<Utc>,
) -> PetResult<WalkOutcome> {
    if let Some(remaining) =
        PetRecord::cooldown_remaining(record.last_walk_time, config.walk_cooldown(), now)
    {
        return Err(PetError::Cooldown {
            activity: Activity::Walk,
            subject: CooldownSubject::Own,
            remaining,
        });
    }

    let event = if rng.chance(config.random_event_chance, "walk branch") {
        discover(&mut record, rng)
    } else {
        encounter(&mut record, catalog, rng)?
    };
    record.last_walk_time = now;

    let level_ups = match &event {
        WalkEvent::Discovery {
            reward: RewardKind::Mood | RewardKind::Satiety,
            ..
        } => Vec::new(),
        _ => check_level_up(&mut record, rng),
    };

    Ok(WalkOutcome {
        record,
        event,
        level_ups,
    })
}

fn discover(record: &mut PetRecord, rng: &mut GameRng) -> WalkEvent {
    let reward = rng
        .pick(&REWARD_KINDS, "discovery reward")
        .copied()
        .unwrap_or(RewardKind::Experience);
    let amount = rng.roll(DISCOVERY_AMOUNT.0, DISCOVERY_AMOUNT.1, "discovery amount");
    let money = rng.roll(DISCOVERY_MONEY.0, DISCOVERY_MONEY.1, "discovery money") as u64;
    let story = rng
        .pick(&DISCOVERIES, "discovery story")
        .map(|line| format!("{}{}", record.name, line))
        .unwrap_or_default();

    match reward {
        RewardKind::Experience => record.gain_experience(amount as u64),
        RewardKind::Mood => {
            record.gain_mood(amount);
        }
        RewardKind::Satiety => {
            record.gain_satiety(amount);
        }
    }
    record.credit(money);

    WalkEvent::Discovery {
        story,
        reward,
        amount,
        money,
    }
}

fn encounter(
    record: &mut PetRecord,
    catalog: &Catalog,
    rng: &mut GameRng,
) -> PetResult<WalkEvent> {
    let spread = rng.int_inclusive(WILD_LEVEL_SPREAD.0, WILD_LEVEL_SPREAD.1, "wild level");
    let wild_level = (record.level as i64 + spread).max(1) as u32;
    let wild_species = rng
        .pick(catalog.all_species(), "wild species")
        .ok_or_else(|| StorageError::Corrupted("catalog has no species".to_string()))?;

    let pet = Fighter::from_record(record, species_of(catalog, record)?);
    let wild = Fighter::wild(wild_species, wild_level);
    let battle = battle::resolve(&pet, &wild, rng);

    let won = battle.winner == Side::Challenger;
    let (experience, money) = if won {
        let bonus = rng.roll(VICTORY_EXP_BONUS.0, VICTORY_EXP_BONUS.1, "victory exp") as u64;
        let money = rng.roll(VICTORY_MONEY.0, VICTORY_MONEY.1, "victory money") as u64;
        (wild_level as u64 * VICTORY_EXP_PER_LEVEL + bonus, money)
    } else {
        (CONSOLATION_EXP, 0)
    };
    record.gain_experience(experience);
    record.credit(money);

    Ok(WalkEvent::Encounter {
        battle,
        won,
        experience,
        money,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::test_support::{game_with, stored};
    use crate::pet::test_support::{epoch, TestPetBuilder};
    use chrono::Duration;
    use pretty_assertions::assert_eq;
    use schema::Species;

    fn catalog() -> Catalog {
        Catalog::builtin().expect("catalog")
    }

    #[test]
    fn test_discovery_of_experience_levels_up() {
        let pet = TestPetBuilder::new("alice", Species::FirePup)
            .experience(5)
            .build();
        // branch, reward kind, amount, money, story, then attack/defense growth
        let mut rng = GameRng::new_for_test(vec![0.0, 0.0, 0.999, 0.0, 0.0, 0.0, 0.999]);
        let outcome = take_walk(pet, &catalog(), &EngineConfig::default(), &mut rng, epoch())
            .expect("walk succeeds");

        assert_eq!(
            outcome.event,
            WalkEvent::Discovery {
                story: "alice在草丛中发现了一些闪闪发光的道具，心情大好！".to_string(),
                reward: RewardKind::Experience,
                amount: 20,
                money: 1,
            }
        );
        let record = &outcome.record;
        assert_eq!((record.level, record.experience), (2, 15));
        assert_eq!((record.attack, record.defense), (11, 12));
        assert_eq!(record.balance, 51);
        assert_eq!(record.last_walk_time, epoch());
        assert_eq!(outcome.level_ups.len(), 1);
    }

    #[test]
    fn test_discovery_of_mood_is_capped_and_skips_level_check() {
        let pet = TestPetBuilder::new("alice", Species::FirePup)
            .mood(95)
            .experience(500)
            .build();
        let mut rng = GameRng::new_for_test(vec![0.5, 0.5, 0.0, 0.999, 0.999]);
        let outcome = take_walk(pet, &catalog(), &EngineConfig::default(), &mut rng, epoch())
            .expect("walk succeeds");

        assert_eq!(outcome.record.mood, 100);
        assert_eq!(outcome.record.level, 1);
        assert_eq!(outcome.record.balance, 60);
        assert!(outcome.level_ups.is_empty());
        assert_eq!(
            outcome.messages(),
            vec![
                "奇遇发生！\nalice找到了一个隐藏的宝箱，里面有一些奖励！\n你的宠物获得了 5 点心情值！"
                    .to_string(),
                "意外之喜！你在路边捡到了 $10！".to_string(),
            ]
        );
    }

    #[test]
    fn test_encounter_won_pays_out() {
        let pet = TestPetBuilder::new("alice", Species::FirePup)
            .stats(500, 10)
            .build();
        // branch, wild level, wild species, one lethal blow, victory exp, victory money
        let mut rng = GameRng::new_for_test(vec![0.9, 0.0, 0.0, 0.5, 0.0, 0.0]);
        let outcome = take_walk(pet, &catalog(), &EngineConfig::default(), &mut rng, epoch())
            .expect("walk succeeds");

        let WalkEvent::Encounter {
            battle,
            won,
            experience,
            money,
        } = &outcome.event
        else {
            panic!("expected an encounter");
        };
        assert!(*won);
        assert_eq!(battle.fighters[1].name, "野生的碧波兽");
        assert_eq!(battle.fighters[1].level, 1);
        assert_eq!((*experience, *money), (6, 5));
        assert_eq!(outcome.record.experience, 6);
        assert_eq!(outcome.record.balance, 55);
        assert_eq!(
            outcome.messages().last().map(String::as_str),
            Some("胜利了！你获得了 6 点经验值和 $5 赏金！")
        );
    }

    #[test]
    fn test_encounter_lost_grants_consolation() {
        let pet = TestPetBuilder::new("alice", Species::LeafyCat)
            .stats(1, 0)
            .satiety(0)
            .build();
        let mut rng = GameRng::new_for_test(vec![0.9, 0.999, 0.999, 0.5, 0.5]);
        let outcome = take_walk(pet, &catalog(), &EngineConfig::default(), &mut rng, epoch())
            .expect("walk succeeds");

        let WalkEvent::Encounter {
            battle,
            won,
            experience,
            money,
        } = &outcome.event
        else {
            panic!("expected an encounter");
        };
        assert!(!*won);
        assert_eq!(battle.fighters[1].name, "野生的金刚");
        assert_eq!(battle.fighters[1].level, 2);
        assert_eq!((*experience, *money), (1, 0));
        assert_eq!(outcome.record.balance, 50);
        assert_eq!(outcome.record.last_walk_time, epoch());
    }

    #[test]
    fn test_walk_during_cooldown_is_rejected() {
        let pet = TestPetBuilder::new("alice", Species::FirePup)
            .walked_at(epoch() - Duration::minutes(2))
            .build();
        let key = pet.key.clone();
        let game = game_with(vec![pet.clone()]);
        let mut rng = GameRng::new_for_test(vec![]);

        let result = game.walk(&key, &mut rng, epoch());
        let Err(error) = result else {
            panic!("walk should be rejected");
        };
        assert!(matches!(
            error,
            PetError::Cooldown {
                activity: Activity::Walk,
                ..
            }
        ));
        assert_eq!(error.to_string(), "刚散步回来，让宠物休息一下吧。(还需等待 0:03:00)");
        assert_eq!(stored(&game, &key), pet);
    }

    #[test]
    fn test_walk_commits_through_the_store() {
        let pet = TestPetBuilder::new("alice", Species::FirePup).build();
        let key = pet.key.clone();
        let game = game_with(vec![pet]);
        let mut rng = GameRng::new_for_test(vec![0.0, 0.5, 0.0, 0.0, 0.0]);

        let outcome = game.walk(&key, &mut rng, epoch()).expect("walk succeeds");
        assert_eq!(stored(&game, &key), outcome.record);

        let again = game.walk(&key, &mut rng, epoch() + Duration::minutes(4));
        assert!(matches!(again, Err(PetError::Cooldown { .. })));
    }

    #[test]
    fn test_walk_without_pet_is_not_found() {
        let game = game_with(vec![]);
        let mut rng = GameRng::new_for_test(vec![]);
        let result = game.walk(&PetKey::new("nobody", "group"), &mut rng, epoch());
        assert!(matches!(result, Err(PetError::NotFound)));
    }
}
