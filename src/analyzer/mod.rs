//! 意味モデル（シンボル、スコープテーブル、スコープスタック、意味型）
//!
//! 宣言パーサーが解析中に直接このモジュールを呼ぶため、
//! 名前はソース順に登録・検査される。

mod scope;
mod symbol;
mod types;

pub use scope::ScopeStack;
pub use symbol::{
    normalize, ParamSymbol, Placeholder, RoutineSymbol, ScopeTable, Symbol, TypeSymbol, VarSymbol,
};
pub use types::{equivalent, RecordField, SemType};
