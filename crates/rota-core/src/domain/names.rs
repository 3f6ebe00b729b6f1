//! Domain names (strongly-typed string identifiers).
//!
//! Person と Cleanup はどちらも「ただの文字列」として入力ファイルに現れますが、
//! 取り違えるとカウンタが静かに壊れます。Phantom type パターンで
//! `PersonName` と `CleanupName` をコンパイル時に区別します。
//!
//! ## Phantom Type パターン
//! `Name<T>` というジェネリック型で共通実装を提供しつつ、
//! `T` は実行時には使わない（PhantomData）マーカー型として扱います。

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;
use std::marker::PhantomData;

/// NameMarker は各名前型のマーカー trait
///
/// エラーメッセージで使う種別名（"person", "cleanup"）を提供します。
pub trait NameMarker: Send + Sync + 'static {
    fn kind() -> &'static str;
}

/// ジェネリック名前型
///
/// JSON / TOML 上では素の文字列としてシリアライズされます（map のキーにも使える）。
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Name<T: NameMarker> {
    value: String,
    #[serde(skip)]
    _marker: PhantomData<T>,
}

impl<T: NameMarker> Name<T> {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            _marker: PhantomData,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.value
    }

    /// 空白のみ・空文字の名前は入力ミスとして扱う
    pub fn is_blank(&self) -> bool {
        self.value.trim().is_empty()
    }

    pub fn kind() -> &'static str {
        T::kind()
    }
}

impl<T: NameMarker> fmt::Display for Name<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

impl<T: NameMarker> From<&str> for Name<T> {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl<T: NameMarker> From<String> for Name<T> {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl<T: NameMarker> Borrow<str> for Name<T> {
    fn borrow(&self) -> &str {
        &self.value
    }
}

// ========================================
// マーカー型の定義
// ========================================

/// Person のマーカー型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Person {}

impl NameMarker for Person {
    fn kind() -> &'static str {
        "person"
    }
}

/// Cleanup のマーカー型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Cleanup {}

impl NameMarker for Cleanup {
    fn kind() -> &'static str {
        "cleanup"
    }
}

/// Name of a roster person (also the column name in the assignment table).
pub type PersonName = Name<Person>;

/// Name of a cleanup type (e.g. `kitchen`, `bathroom_2`).
pub type CleanupName = Name<Cleanup>;
