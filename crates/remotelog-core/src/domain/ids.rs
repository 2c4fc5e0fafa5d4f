//! Store-issued identifiers (strongly-typed IDs).
//!
//! ## Phantom Type パターン
//! `Id<T>` というジェネリック型で共通実装を提供しつつ、
//! `T` は実行時には使わない（PhantomData）マーカー型として、
//! コンパイル時の型安全性を提供します。
//!
//! - `SequenceToken`: log stream への `put_events` が返すトークン
//! - `RecordId`: delivery stream が受理したレコードの ID
//!
//! どちらも ULID ベースなので、発行順にソートできます。

use serde::{Deserialize, Serialize};
use std::fmt;
use std::marker::PhantomData;
use ulid::Ulid;

/// IdMarker は各 ID 型のマーカー trait
pub trait IdMarker: Send + Sync + 'static {
    /// Display で使うプレフィックス（例: "seq-", "record-"）
    fn prefix() -> &'static str;
}

#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Id<T: IdMarker> {
    ulid: Ulid,
    #[serde(skip)]
    _marker: PhantomData<T>,
}

impl<T: IdMarker> Id<T> {
    pub fn from_ulid(ulid: Ulid) -> Self {
        Self {
            ulid,
            _marker: PhantomData,
        }
    }

    pub fn as_ulid(&self) -> Ulid {
        self.ulid
    }
}

impl<T: IdMarker> From<Ulid> for Id<T> {
    fn from(ulid: Ulid) -> Self {
        Self::from_ulid(ulid)
    }
}

impl<T: IdMarker> fmt::Display for Id<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", T::prefix(), self.ulid)
    }
}

// ========================================
// マーカー型の定義
// ========================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Sequence {}

impl IdMarker for Sequence {
    fn prefix() -> &'static str {
        "seq-"
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Record {}

impl IdMarker for Record {
    fn prefix() -> &'static str {
        "record-"
    }
}

/// Token returned by a log stream after accepting a batch of events.
pub type SequenceToken = Id<Sequence>;

/// Identifier of a record accepted by a delivery stream.
pub type RecordId = Id<Record>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefixes_distinguish_id_kinds() {
        let ulid = Ulid::new();
        let token = SequenceToken::from_ulid(ulid);
        let record: RecordId = ulid.into();

        assert_eq!(token.as_ulid(), record.as_ulid());
        assert!(token.to_string().starts_with("seq-"));
        assert!(record.to_string().starts_with("record-"));
        // let _: SequenceToken = record; // <- does not compile
    }

    #[test]
    fn ids_can_be_serialized() {
        let token = SequenceToken::from_ulid(Ulid::new());
        let serialized = serde_json::to_string(&token).unwrap();
        let deserialized: SequenceToken = serde_json::from_str(&serialized).unwrap();
        assert_eq!(token, deserialized);
    }

    #[test]
    fn phantom_data_does_not_consume_memory() {
        use std::mem::size_of;
        assert_eq!(size_of::<SequenceToken>(), size_of::<Ulid>());
        assert_eq!(size_of::<RecordId>(), size_of::<Ulid>());
    }
}
