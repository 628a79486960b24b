//! Shop, purchases, feeding and the backpack.
//!
//! Money and items only move through the store's conditional mutations, so a
//! purchase can never leave the balance negative and a feeding can never burn
//! an item the owner does not hold.

use crate::errors::{PetError, PetResult};
use crate::game::{observe, PetGame};
use crate::pet::{PetKey, PetRecord};
use crate::store::{InventoryEntry, PetStore};
use chrono::{DateTime, Utc};
use schema::ShopItem;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Purchase {
    pub item: String,
    pub quantity: u32,
    pub total_cost: u64,
    pub balance: u64,
    /// Units of the item held after the purchase.
    pub held: u32,
}

impl fmt::Display for Purchase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "购买成功！你花费 ${} 购买了 {} 个「{}」。",
            self.total_cost, self.quantity, self.item
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Feeding {
    pub record: PetRecord,
    pub item: String,
    /// The item's listed restore amounts. The reply quotes these.
    pub item_satiety: u32,
    pub item_mood: u32,
    /// Gains actually applied after capping.
    pub satiety_gain: u32,
    pub mood_gain: u32,
    /// Units of the item left in the backpack.
    pub remaining: u32,
}

impl fmt::Display for Feeding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "你给「{}」投喂了「{}」，它的饱食度增加了 {}，心情值增加了 {}！",
            self.record.name, self.item, self.item_satiety, self.item_mood
        )
    }
}

impl<S: PetStore> PetGame<S> {
    pub fn shop_listing(&self) -> &[ShopItem] {
        self.catalog().items()
    }

    /// Buys `quantity` units, spending and granting in one transaction.
    pub fn purchase(&self, key: &PetKey, item_name: &str, quantity: u32) -> PetResult<Purchase> {
        if quantity == 0 {
            return Err(PetError::InvalidQuantity);
        }
        let item = self
            .catalog()
            .item(item_name)
            .ok_or_else(|| PetError::UnknownItem(item_name.to_string()))?;
        let total_cost = item.cost_of(quantity).ok_or(PetError::InvalidQuantity)?;

        let purchase = self.store().transaction(|tx| {
            let balance = tx.spend(key, total_cost)?;
            let held = tx.grant_item(key, &item.name, quantity)?;
            Ok(Purchase {
                item: item.name.clone(),
                quantity,
                total_cost,
                balance,
                held,
            })
        });

        match &purchase {
            Ok(done) => tracing::info!(
                pet = %key,
                item = %done.item,
                quantity,
                cost = done.total_cost,
                "purchased"
            ),
            Err(e) if e.is_user_facing() => {
                tracing::debug!(pet = %key, item = item_name, reason = %e, "purchase rejected")
            }
            Err(_) => {}
        }
        purchase
    }

    /// Feeds one unit of a food item to the pet.
    pub fn consume(
        &self,
        key: &PetKey,
        item_name: &str,
        now: DateTime<Utc>,
    ) -> PetResult<Feeding> {
        self.settle(key, now)?;
        let item = self
            .catalog()
            .item(item_name)
            .filter(|item| item.is_food())
            .ok_or_else(|| PetError::NotFood(item_name.to_string()))?;

        let feeding = self.store().transaction(|tx| {
            let mut record = observe(tx, key, now, self.config())?.record;
            let remaining = tx.take_item(key, &item.name)?;
            let satiety_gain = record.gain_satiety(item.satiety);
            let mood_gain = record.gain_mood(item.mood);
            record.last_fed_time = now;
            tx.put_pet(record.clone())?;
            Ok(Feeding {
                record,
                item: item.name.clone(),
                item_satiety: item.satiety,
                item_mood: item.mood,
                satiety_gain,
                mood_gain,
                remaining,
            })
        });

        match &feeding {
            Ok(done) => tracing::info!(
                pet = %key,
                item = %done.item,
                satiety = done.satiety_gain,
                mood = done.mood_gain,
                "fed"
            ),
            Err(e) if e.is_user_facing() => {
                tracing::debug!(pet = %key, item = item_name, reason = %e, "feeding rejected")
            }
            Err(_) => {}
        }
        feeding
    }

    /// The owner's items ordered by name. `NotFound` without a pet.
    pub fn backpack(&self, key: &PetKey, now: DateTime<Utc>) -> PetResult<Vec<InventoryEntry>> {
        self.store().transaction(|tx| {
            observe(tx, key, now, self.config())?;
            tx.items(key)
        })
    }
}

/// The shop menu as one reply.
pub fn format_shop(items: &[ShopItem]) -> String {
    let mut reply = String::from("欢迎光临宠物商店！\n--------------------\n");
    for item in items {
        reply.push_str(&format!(
            "【{}】 ${}\n效果: {}\n",
            item.name, item.price, item.description
        ));
    }
    reply
}

/// An owner's backpack as one reply.
pub fn format_backpack(owner_name: &str, entries: &[InventoryEntry]) -> String {
    if entries.is_empty() {
        return "你的背包空空如也，去商店看看吧！".to_string();
    }
    let mut reply = format!("{}的背包:\n--------------------\n", owner_name);
    for entry in entries {
        reply.push_str(&format!("【{}】 x {}\n", entry.item_name, entry.quantity));
    }
    reply
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

    const RATION: &str = "普通口粮";

    fn game_for(pet: PetRecord) -> (PetGame<crate::store::MemoryStore>, PetKey) {
        let key = pet.key.clone();
        (game_with(vec![pet]), key)
    }

    #[test]
    fn test_purchase_beyond_balance_is_rejected() {
        let pet = TestPetBuilder::new("alice", Species::FirePup)
            .balance(25)
            .build();
        let (game, key) = game_for(pet);

        let result = game.purchase(&key, RATION, 3);
        assert!(matches!(
            result,
            Err(PetError::InsufficientFunds {
                needed: 30,
                balance: 25
            })
        ));
        assert_eq!(stored(&game, &key).balance, 25);
        assert!(game.backpack(&key, epoch()).expect("backpack").is_empty());
    }

    #[test]
    fn test_purchase_spends_and_grants_together() {
        let pet = TestPetBuilder::new("alice", Species::FirePup)
            .balance(35)
            .build();
        let (game, key) = game_for(pet);

        let purchase = game.purchase(&key, RATION, 3).expect("purchase succeeds");
        assert_eq!(
            purchase,
            Purchase {
                item: RATION.to_string(),
                quantity: 3,
                total_cost: 30,
                balance: 5,
                held: 3,
            }
        );
        assert_eq!(purchase.to_string(), "购买成功！你花费 $30 购买了 3 个「普通口粮」。");
        assert_eq!(stored(&game, &key).balance, 5);

        let backpack = game.backpack(&key, epoch()).expect("backpack");
        assert_eq!(backpack.len(), 1);
        assert_eq!(backpack[0].quantity, 3);
    }

    #[test]
    fn test_purchase_rejects_bad_requests() {
        let (game, key) = game_for(TestPetBuilder::new("alice", Species::FirePup).build());

        assert!(matches!(game.purchase(&key, RATION, 0), Err(PetError::InvalidQuantity)));
        assert!(matches!(
            game.purchase(&key, "神秘药水", 1),
            Err(PetError::UnknownItem(name)) if name == "神秘药水"
        ));
        assert!(matches!(
            game.purchase(&key.neighbour("bob"), RATION, 1),
            Err(PetError::NotFound)
        ));
    }

    #[test]
    fn test_purchase_that_would_overflow_the_stack_charges_nothing() {
        let pet = TestPetBuilder::new("alice", Species::FirePup)
            .balance(1000)
            .build();
        let (game, key) = game_for(pet);
        game.store()
            .transaction(|tx| tx.grant_item(&key, RATION, u32::MAX - 1))
            .expect("seeding succeeds");

        let result = game.purchase(&key, RATION, 5);
        assert!(matches!(result, Err(PetError::InvalidQuantity)));

        assert_eq!(stored(&game, &key).balance, 1000);
        let backpack = game.backpack(&key, epoch()).expect("backpack");
        assert_eq!(backpack[0].quantity, u32::MAX - 1);
    }

    #[test]
    fn test_concurrent_purchases_never_overdraw() {
        let pet = TestPetBuilder::new("alice", Species::FirePup)
            .balance(35)
            .build();
        let (game, key) = game_for(pet);
        let game = Arc::new(game);

        let handles: Vec<_> = (0..3)
            .map(|_| {
                let game = Arc::clone(&game);
                let key = key.clone();
                thread::spawn(move || game.purchase(&key, RATION, 2).is_ok())
            })
            .collect();
        let bought = handles
            .into_iter()
            .map(|h| h.join().expect("thread finished"))
            .filter(|ok| *ok)
            .count();

        assert_eq!(bought, 1);
        assert_eq!(stored(&game, &key).balance, 15);
        let backpack = game.backpack(&key, epoch()).expect("backpack");
        assert_eq!(backpack[0].quantity, 2);
    }

    #[test]
    fn test_feeding_caps_satiety_and_burns_the_item() {
        let (game, key) = game_for(
            TestPetBuilder::new("alice", Species::FirePup)
                .satiety(95)
                .mood(50)
                .build(),
        );
        game.purchase(&key, RATION, 1).expect("purchase succeeds");
        let later = epoch() + Duration::minutes(30);

        let feeding = game.consume(&key, RATION, later).expect("feeding succeeds");

        assert_eq!((feeding.satiety_gain, feeding.mood_gain), (5, 5));
        assert_eq!((feeding.record.satiety, feeding.record.mood), (100, 55));
        assert_eq!(feeding.remaining, 0);
        assert_eq!(
            feeding.to_string(),
            "你给「alice」投喂了「普通口粮」，它的饱食度增加了 20，心情值增加了 5！"
        );

        let record = stored(&game, &key);
        assert_eq!(record.last_fed_time, later);
        assert_eq!(record.satiety, 100);
        assert!(game.backpack(&key, later).expect("backpack").is_empty());
    }

    #[test]
    fn test_feeding_without_stock_changes_nothing() {
        let pet = TestPetBuilder::new("alice", Species::FirePup).satiety(40).build();
        let (game, key) = game_for(pet.clone());

        let result = game.consume(&key, RATION, epoch());
        assert!(matches!(result, Err(PetError::NotOwned(name)) if name == RATION));
        assert_eq!(stored(&game, &key), pet);
    }

    #[test]
    fn test_feeding_unknown_item_is_not_food() {
        let (game, key) = game_for(TestPetBuilder::new("alice", Species::FirePup).build());
        assert!(matches!(
            game.consume(&key, "石头", epoch()),
            Err(PetError::NotFood(name)) if name == "石头"
        ));
        assert!(matches!(
            game.consume(&key.neighbour("bob"), RATION, epoch()),
            Err(PetError::NotFound)
        ));
    }

    #[test]
    fn test_backpack_is_ordered_by_name() {
        let pet = TestPetBuilder::new("alice", Species::FirePup)
            .balance(500)
            .build();
        let (game, key) = game_for(pet);
        for item in game.shop_listing().to_vec().iter().rev() {
            game.purchase(&key, &item.name, 2).expect("purchase succeeds");
        }

        let names: Vec<String> = game
            .backpack(&key, epoch())
            .expect("backpack")
            .into_iter()
            .map(|entry| entry.item_name)
            .collect();
        let mut sorted = names.clone();
        sorted.sort();
        assert_eq!(names.len(), 3);
        assert_eq!(names, sorted);
        assert!(format_backpack("Alice", &[]).contains("空空如也"));
    }

    #[test]
    fn test_shop_listing_keeps_catalog_order() {
        let (game, _) = game_for(TestPetBuilder::new("alice", Species::FirePup).build());
        let names: Vec<&str> = game.shop_listing().iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["普通口粮", "美味罐头", "心情饼干"]);
        assert!(format_shop(game.shop_listing()).contains("【美味罐头】 $30"));
    }
}
