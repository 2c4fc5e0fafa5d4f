//! IdGenerator port - ID 生成の抽象化
//!
//! in-memory ストアが sequence token や record ID を発行するときに使います。
//! テスト容易性のために、trait として抽象化しています。

use crate::domain::ids::{RecordId, SequenceToken};
use crate::ports::Clock;
use ulid::Ulid;

/// IdGenerator はストアが発行する ID を生成
///
/// # Thread Safety
/// - `Send + Sync` を要求（複数スレッドから使える）
pub trait IdGenerator: Send + Sync {
    fn generate_sequence_token(&self) -> SequenceToken;

    fn generate_record_id(&self) -> RecordId;
}

/// UlidGenerator は ULID ベースの ID 生成器
///
/// Clock を使って現在時刻ベースの ULID を生成します。
/// FixedClock を使えば timestamp 部分が決定的になります。
pub struct UlidGenerator<C> {
    clock: C,
}

impl<C: Clock> UlidGenerator<C> {
    pub fn new(clock: C) -> Self {
        Self { clock }
    }

    fn next_ulid(&self) -> Ulid {
        let timestamp_ms = self.clock.now().timestamp_millis().max(0) as u64;
        Ulid::from_parts(timestamp_ms, rand::random())
    }
}

impl<C: Clock> IdGenerator for UlidGenerator<C> {
    fn generate_sequence_token(&self) -> SequenceToken {
        SequenceToken::from(self.next_ulid())
    }

    fn generate_record_id(&self) -> RecordId {
        RecordId::from(self.next_ulid())
    }
}
