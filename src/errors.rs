use chrono::Duration;
use std::fmt;
use thiserror::Error;

/// Activities gated by a cooldown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Activity {
    Walk,
    Duel,
}

/// Whose cooldown blocked the activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CooldownSubject {
    Own,
    Opponent,
}

/// Why a pet cannot evolve right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvolutionBlock {
    AlreadyFinalForm,
    LevelTooLow { required: u32 },
}

/// Why a duel target was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetProblem {
    SelfDuel,
    OpponentHasNoPet,
}

/// Expected, recoverable outcomes plus the single fatal storage class.
///
/// Everything except `Storage` is a normal user-facing rejection that the
/// chat layer renders verbatim.
#[derive(Debug, Error)]
pub enum PetError {
    #[error("你还没有宠物哦，快去领养一只吧！")]
    NotFound,

    #[error("你在这个群里已经有一只宠物啦！")]
    AlreadyExists,

    #[error("{}", describe_cooldown(.activity, .subject, .remaining))]
    Cooldown {
        activity: Activity,
        subject: CooldownSubject,
        remaining: Duration,
    },

    #[error("你的钱不够哦！需要 ${needed}，当前余额 ${balance}。")]
    InsufficientFunds { needed: u64, balance: u64 },

    #[error("商店里没有「{0}」这种东西。")]
    UnknownItem(String),

    #[error("购买数量必须大于零。")]
    InvalidQuantity,

    #[error("你的背包里没有「{0}」。")]
    NotOwned(String),

    #[error("「{0}」不是可以投喂的食物。")]
    NotFood(String),

    #[error("{0}")]
    EvolutionNotEligible(EvolutionBlock),

    #[error("{0}")]
    InvalidTarget(TargetProblem),

    #[error("storage failure: {0}")]
    Storage(#[from] StorageError),
}

impl PetError {
    /// True for every rejection a player can cause; false for infrastructure failures.
    pub fn is_user_facing(&self) -> bool {
        !matches!(self, PetError::Storage(_))
    }
}

/// Failures of the persistence layer itself.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("pet store lock was poisoned")]
    LockPoisoned,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("corrupted data: {0}")]
    Corrupted(String),
}

/// Failures while loading static catalogs or engine configuration.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("I/O error reading {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed data in {path}: {message}")]
    Parse { path: String, message: String },

    #[error("invalid catalog: {0}")]
    Invalid(String),
}

impl fmt::Display for EvolutionBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EvolutionBlock::AlreadyFinalForm => write!(f, "你的宠物已是最终形态，无法再进化。"),
            EvolutionBlock::LevelTooLow { required } => {
                write!(f, "你的宠物需达到 Lv.{} 才能进化。", required)
            }
        }
    }
}

impl fmt::Display for TargetProblem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TargetProblem::SelfDuel => write!(f, "不能和自己对决哦。"),
            TargetProblem::OpponentHasNoPet => write!(f, "对方还没有宠物呢。"),
        }
    }
}

/// Formats a remaining cooldown as H:MM:SS, dropping sub-second precision.
pub fn format_remaining(remaining: Duration) -> String {
    let total = remaining.num_seconds().max(0);
    format!("{}:{:02}:{:02}", total / 3600, (total % 3600) / 60, total % 60)
}

fn describe_cooldown(
    activity: &Activity,
    subject: &CooldownSubject,
    remaining: &Duration,
) -> String {
    let wait = format_remaining(*remaining);
    match (activity, subject) {
        (Activity::Walk, _) => format!("刚散步回来，让宠物休息一下吧。(还需等待 {})", wait),
        (Activity::Duel, CooldownSubject::Own) => {
            format!("你的对决技能正在冷却中，还需等待 {}。", wait)
        }
        (Activity::Duel, CooldownSubject::Opponent) => {
            format!("对方的宠物正在休息，还需等待 {} 才能接受对决。", wait)
        }
    }
}

/// Type alias for Results using PetError
pub type PetResult<T> = Result<T, PetError>;

/// Type alias for Results using StorageError
pub type StorageResult<T> = Result<T, StorageError>;

/// Type alias for Results using CatalogError
pub type CatalogResult<T> = Result<T, CatalogError>;
