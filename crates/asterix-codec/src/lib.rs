//! # asterix-codec
//!
//! Encode and decode EUROCONTROL ASTERIX surveillance data blocks
//! against category schemas supplied at runtime.
//!
//! A category definition (normally produced by an external spec loader)
//! is compiled into a [category::Category], registered with a
//! [codec::Codec], and then drives the bit-level wire codec: FSPEC
//! presence bitmaps, the item encodings (Fixed, Extended, Repetitive,
//! RepetitiveGroup, RepetitiveGroupFx, Explicit, Compound), and UAP
//! variant selection.
//!
//! ## Example
//!
//! ```
//! use asterix_codec::category::{Category, CategorySpec};
//! use asterix_codec::codec::Codec;
//! use asterix_codec::element::ElementSpec;
//! use asterix_codec::item::{ItemSpec, Presence};
//!
//! let spec = CategorySpec {
//!     cat: 63,
//!     items: vec![ItemSpec::fixed(
//!         "010",
//!         "Data Source Identifier",
//!         Presence::Mandatory,
//!         vec![ElementSpec::new("SAC", 8), ElementSpec::new("SIC", 8)],
//!     )],
//!     uaps: [("default".to_string(), vec!["010".to_string()])].into(),
//!     default_uap: "default".to_string(),
//!     ..Default::default()
//! };
//!
//! let mut codec = Codec::new();
//! codec.register_category(Category::compile(&spec).unwrap());
//!
//! let block = codec.decode(&[0x3F, 0x00, 0x06, 0x80, 0x05, 0x12]);
//! assert!(block.valid);
//! assert_eq!(block.records[0].item("010").unwrap().field("SAC"), Some(5));
//! ```

pub mod bits;
pub mod category;
pub mod codec;
pub mod compiled;
pub mod decoded;
pub mod element;
pub mod errors;
pub mod fspec;
pub mod item;
#[cfg(feature = "serde")]
pub mod serde;
