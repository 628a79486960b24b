//! Duels between two pets of the same group.

use crate::battle::{self, BattleOutcome, Fighter, Side};
use crate::catalog::Catalog;
use crate::config::EngineConfig;
use crate::errors::{Activity, CooldownSubject, PetError, PetResult, TargetProblem};
use crate::game::{observe, species_of, PetGame};
use crate::pet::{PetKey, PetRecord};
use crate::progression::{check_level_up, LevelUp};
use crate::rng::GameRng;
use crate::store::PetStore;
use chrono::{DateTime, Utc};

const WINNER_BASE_EXP: u64 = 10;
const WINNER_EXP_PER_LOSER_LEVEL: u64 = 2;
const LOSER_BASE_EXP: u64 = 5;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuelOutcome {
    pub challenger: PetRecord,
    pub target: PetRecord,
    pub battle: BattleOutcome,
    pub winner_experience: u64,
    pub loser_experience: u64,
    pub purse: u64,
    /// Winner's level-ups first, then the loser's.
    pub level_ups: Vec<LevelUp>,
}

impl DuelOutcome {
    pub fn winner(&self) -> Side {
        self.battle.winner
    }

    pub fn winner_record(&self) -> &PetRecord {
        match self.battle.winner {
            Side::Challenger => &self.challenger,
            Side::Defender => &self.target,
        }
    }

    pub fn messages(&self) -> Vec<String> {
        let mut lines = self.battle.log();
        lines.push(format!(
            "对决结算：胜利者获得了 {} 点经验值和 ${}，参与者获得了 {} 点经验值。",
            self.winner_experience, self.purse, self.loser_experience
        ));
        lines.extend(self.level_ups.iter().map(|level_up| level_up.to_string()));
        lines
    }
}

impl<S: PetStore> PetGame<S> {
    /// Challenger fights the target's pet. Both records change together or not at all.
    pub fn duel(
        &self,
        challenger: &PetKey,
        target: &PetKey,
        rng: &mut GameRng,
        now: DateTime<Utc>,
    ) -> PetResult<DuelOutcome> {
        if challenger == target {
            return Err(PetError::InvalidTarget(TargetProblem::SelfDuel));
        }
        self.settle(challenger, now)?;
        if challenger.group_id != target.group_id {
            return Err(PetError::InvalidTarget(TargetProblem::OpponentHasNoPet));
        }
        self.settle(target, now).map_err(opponent_missing)?;

        let outcome = self.store().transaction(|tx| {
            let challenger_pet = observe(tx, challenger, now, self.config())?.record;
            let target_pet = observe(tx, target, now, self.config())
                .map_err(opponent_missing)?
                .record;
            let outcome = fight_duel(
                challenger_pet,
                target_pet,
                self.catalog(),
                self.config(),
                rng,
                now,
            )?;
            tx.put_pet(outcome.challenger.clone())?;
            tx.put_pet(outcome.target.clone())?;
            Ok(outcome)
        });

        match &outcome {
            Ok(done) => tracing::info!(
                challenger = %challenger,
                target = %target,
                winner = ?done.winner(),
                turns = done.battle.turns,
                "duel finished"
            ),
            Err(e) if e.is_user_facing() => tracing::debug!(
                challenger = %challenger,
                target = %target,
                reason = %e,
                "duel rejected"
            ),
            Err(_) => {}
        }
        outcome
    }
}

fn opponent_missing(error: PetError) -> PetError {
    match error {
        PetError::NotFound => PetError::InvalidTarget(TargetProblem::OpponentHasNoPet),
        other => other,
    }
}

/// Resolves a duel between two record snapshots, checking both cooldowns first.
pub fn fight_duel(
    mut challenger: PetRecord,
    mut target: PetRecord,
    catalog: &Catalog,
    config: &EngineConfig,
    rng: &mut GameRng,
    now: DateTime<Utc>,
) -> PetResult<DuelOutcome> {
    let cooldown = config.duel_cooldown();
    for (record, subject) in [
        (&challenger, CooldownSubject::Own),
        (&target, CooldownSubject::Opponent),
    ] {
        if let Some(remaining) = PetRecord::cooldown_remaining(record.last_duel_time, cooldown, now)
        {
            return Err(PetError::Cooldown {
                activity: Activity::Duel,
                subject,
                remaining,
            });
        }
    }

    let battle = battle::resolve(
        &Fighter::from_record(&challenger, species_of(catalog, &challenger)?),
        &Fighter::from_record(&target, species_of(catalog, &target)?),
        rng,
    );

    challenger.last_duel_time = now;
    target.last_duel_time = now;

    let (winner, loser) = match battle.winner {
        Side::Challenger => (&mut challenger, &mut target),
        Side::Defender => (&mut target, &mut challenger),
    };
    let winner_experience = WINNER_BASE_EXP + loser.level as u64 * WINNER_EXP_PER_LOSER_LEVEL;
    let loser_experience = LOSER_BASE_EXP + winner.level as u64;

    winner.gain_experience(winner_experience);
    winner.credit(config.duel_purse);
    loser.gain_experience(loser_experience);

    let mut level_ups = check_level_up(winner, rng);
    level_ups.extend(check_level_up(loser, rng));

    Ok(DuelOutcome {
        challenger,
        target,
        battle,
        winner_experience,
        loser_experience,
        purse: config.duel_purse,
        level_ups,
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
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_challenger_wins_and_both_cool_down() {
        let challenger = TestPetBuilder::new("alice", Species::FirePup)
            .level(5)
            .stats(500, 10)
            .build();
        let target = TestPetBuilder::new("bob", Species::WaterSprite)
            .level(3)
            .build();
        let (a, b) = (challenger.key.clone(), target.key.clone());
        let game = game_with(vec![challenger, target]);
        let mut rng = GameRng::new_for_test(vec![0.5]);

        let outcome = game.duel(&a, &b, &mut rng, epoch()).expect("duel succeeds");

        assert_eq!(outcome.winner(), Side::Challenger);
        assert_eq!(outcome.winner_record().name, "alice");
        assert_eq!((outcome.winner_experience, outcome.loser_experience), (16, 10));
        assert!(outcome.level_ups.is_empty());

        let alice = stored(&game, &a);
        let bob = stored(&game, &b);
        assert_eq!((alice.experience, alice.balance), (16, 70));
        assert_eq!((bob.experience, bob.balance), (10, 50));
        assert_eq!(alice.last_duel_time, epoch());
        assert_eq!(bob.last_duel_time, epoch());
        assert_eq!(
            outcome.messages().last().map(String::as_str),
            Some("对决结算：胜利者获得了 16 点经验值和 $20，参与者获得了 10 点经验值。")
        );
    }

    #[test]
    fn test_defender_wins_and_loser_levels_up() {
        let challenger = TestPetBuilder::new("alice", Species::LeafyCat)
            .stats(1, 0)
            .satiety(0)
            .experience(5)
            .build();
        let target = TestPetBuilder::new("bob", Species::KingKong)
            .level(2)
            .stats(100, 0)
            .build();
        let (a, b) = (challenger.key.clone(), target.key.clone());
        let game = game_with(vec![challenger, target]);
        // challenger's blow, target's blow, then the loser's level-up growth
        let mut rng = GameRng::new_for_test(vec![0.5, 0.5, 0.0, 0.0]);

        let outcome = game.duel(&a, &b, &mut rng, epoch()).expect("duel succeeds");

        assert_eq!(outcome.winner(), Side::Defender);
        assert_eq!((outcome.winner_experience, outcome.loser_experience), (12, 7));
        assert_eq!(outcome.level_ups.len(), 1);
        assert_eq!(outcome.level_ups[0].pet_name, "alice");

        let alice = stored(&game, &a);
        let bob = stored(&game, &b);
        assert_eq!((alice.level, alice.experience), (2, 2));
        assert_eq!((alice.attack, alice.defense), (2, 1));
        assert_eq!(alice.balance, 50);
        assert_eq!((bob.experience, bob.balance), (12, 70));
    }

    #[test]
    fn test_self_duel_is_rejected() {
        let pet = TestPetBuilder::new("alice", Species::FirePup).build();
        let key = pet.key.clone();
        let game = game_with(vec![pet]);
        let mut rng = GameRng::new_for_test(vec![]);

        let result = game.duel(&key, &key, &mut rng, epoch());
        assert!(matches!(
            result,
            Err(PetError::InvalidTarget(TargetProblem::SelfDuel))
        ));
    }

    #[test]
    fn test_missing_pets_are_reported_by_side() {
        let pet = TestPetBuilder::new("alice", Species::FirePup).build();
        let key = pet.key.clone();
        let game = game_with(vec![pet]);
        let mut rng = GameRng::new_for_test(vec![]);

        let stranger = key.neighbour("bob");
        assert!(matches!(
            game.duel(&key, &stranger, &mut rng, epoch()),
            Err(PetError::InvalidTarget(TargetProblem::OpponentHasNoPet))
        ));
        assert!(matches!(
            game.duel(&stranger, &key, &mut rng, epoch()),
            Err(PetError::NotFound)
        ));
    }

    #[test]
    fn test_pets_in_other_groups_cannot_be_challenged() {
        let alice = TestPetBuilder::new("alice", Species::FirePup).build();
        let mut bob = TestPetBuilder::new("bob", Species::FirePup).build();
        bob.key = PetKey::new("bob", "elsewhere");
        let (a, b) = (alice.key.clone(), bob.key.clone());
        let game = game_with(vec![alice, bob]);
        let mut rng = GameRng::new_for_test(vec![]);

        assert!(matches!(
            game.duel(&a, &b, &mut rng, epoch()),
            Err(PetError::InvalidTarget(TargetProblem::OpponentHasNoPet))
        ));
    }

    #[test]
    fn test_challenger_cooldown_is_checked_first() {
        let challenger = TestPetBuilder::new("alice", Species::FirePup)
            .dueled_at(epoch() - Duration::minutes(10))
            .build();
        let target = TestPetBuilder::new("bob", Species::FirePup)
            .dueled_at(epoch() - Duration::minutes(5))
            .build();
        let (a, b) = (challenger.key.clone(), target.key.clone());
        let game = game_with(vec![challenger, target]);
        let mut rng = GameRng::new_for_test(vec![]);

        let error = game
            .duel(&a, &b, &mut rng, epoch())
            .expect_err("challenger is cooling down");
        assert_eq!(error.to_string(), "你的对决技能正在冷却中，还需等待 0:20:00。");
    }

    #[test]
    fn test_target_cooldown_blocks_the_duel() {
        let challenger = TestPetBuilder::new("alice", Species::FirePup).build();
        let target = TestPetBuilder::new("bob", Species::FirePup)
            .dueled_at(epoch() - Duration::minutes(29))
            .build();
        let (a, b) = (challenger.key.clone(), target.key.clone());
        let game = game_with(vec![challenger.clone(), target]);
        let mut rng = GameRng::new_for_test(vec![]);

        let error = game
            .duel(&a, &b, &mut rng, epoch())
            .expect_err("target is cooling down");
        assert!(matches!(
            error,
            PetError::Cooldown {
                activity: Activity::Duel,
                subject: CooldownSubject::Opponent,
                ..
            }
        ));
        assert_eq!(error.to_string(), "对方的宠物正在休息，还需等待 0:01:00 才能接受对决。");
        assert_eq!(stored(&game, &a), challenger);
    }

    #[test]
    fn test_concurrent_challenges_against_one_target() {
        let target = TestPetBuilder::new("target", Species::WaterSprite).build();
        let challengers: Vec<PetRecord> = (0..6)
            .map(|i| {
                TestPetBuilder::new(&format!("challenger-{}", i), Species::FirePup)
                    .stats(500, 10)
                    .build()
            })
            .collect();
        let target_key = target.key.clone();
        let keys: Vec<PetKey> = challengers.iter().map(|p| p.key.clone()).collect();
        let mut pets = challengers;
        pets.push(target);
        let game = Arc::new(game_with(pets));

        let handles: Vec<_> = keys
            .into_iter()
            .enumerate()
            .map(|(i, key)| {
                let game = Arc::clone(&game);
                let target_key = target_key.clone();
                thread::spawn(move || {
                    let mut rng = GameRng::from_seed(i as u64);
                    game.duel(&key, &target_key, &mut rng, epoch()).is_ok()
                })
            })
            .collect();
        let fought = handles
            .into_iter()
            .map(|h| h.join().expect("thread finished"))
            .filter(|ok| *ok)
            .count();

        assert_eq!(fought, 1);
        assert_eq!(stored(&game, &target_key).experience, 6);
    }
}
