//! Audience segmentation rules
//!
//! An audience is described by an ordered list of rule rows, each a
//! `field operator value` predicate typed by the user. Rows are compiled into
//! a segment document, the query the backend runs to select customers, and
//! documents coming back from the backend can be decompiled into rows again.
//!
//! # Document shape
//!
//! ```text
//! {"name": "Aman"}                        name equals "Aman"
//! {"visits": {"$gte": 3, "$lt": 10}}      3 <= visits < 10
//! {"email": {"$in": ["a@x.io", "b@x.io"]}} email is one of the list
//! ```
//!
//! All fields are ANDed, and so are the operators within one field.
//!
//! # Operators
//!
//! - `$eq` / `eq`, `$ne` / `ne`
//! - `$gt`, `$gte`, `$lt`, `$lte`
//! - `$in` / `in`, `$nin` / `notIn` - comma separated list values
//! - `$regex` / `matchesRegex`

pub mod coerce;
pub mod compiler;
pub mod decompiler;
pub mod document;
pub mod editor;
pub mod error;
pub mod field;
pub mod input;
pub mod row;

pub use coerce::{coerce, coerce_raw};
pub use compiler::{Collision, CollisionKind, collisions, compile};
pub use decompiler::{decompile, decompile_onto};
pub use document::{FieldRule, SegmentQueryDocument};
pub use editor::{RuleEditor, SubscriptionId};
pub use error::SegmentError;
pub use field::{Field, Operator};
pub use input::{read_document_file, read_rows_file};
pub use row::{RawValue, RowId, RuleRow};
