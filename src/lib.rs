//! Framequote
//!
//! Framequote prices custom framing orders. Given the outer dimensions of a
//! piece and the materials chosen for it, it derives the geometry, builds a
//! bill of materials, charges the moulding offcut, applies the markup and
//! reconciles the discount and surcharge into a final price and margin.
//!
//! ```
//! use framequote::prelude::*;
//! use rust_decimal::Decimal;
//!
//! let moulding = MaterialReference::new(
//!     "MOL-1020",
//!     "Moulding 2cm black",
//!     UnitOfMeasure::Linear,
//!     Decimal::new(250, 2),
//! );
//!
//! let order = OrderSpecification::new(ProductType::Picture, Decimal::from(30), Decimal::from(40))
//!     .with_material(Category::Frame, moulding);
//!
//! let snapshot = calculate(&order, &QuotationConfig::default())?;
//!
//! assert_eq!(snapshot.total_cost(), Decimal::from(675));
//! assert_eq!(snapshot.final_price(), Decimal::from(2025));
//! # Ok::<(), QuotationError>(())
//! ```

pub mod bom;
pub mod cli;
pub mod config;
pub mod costs;
pub mod fixtures;
pub mod geometry;
pub mod materials;
pub mod orders;
pub mod prelude;
pub mod pricing;
pub mod quotation;
pub mod receipt;
pub mod selections;
