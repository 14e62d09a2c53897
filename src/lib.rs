//! A compiler front-end for the flowpath packet-processing DSL.
//!
//! Flowpath programs describe software-defined-networking pipelines: packet
//! header layouts, decoders that parse successive headers from a byte stream,
//! flow tables keyed on extracted fields, and ports. This crate implements the
//! lowering stage: a tree-to-tree rewrite that eliminates the network-specific
//! syntactic forms in favor of ordinary imperative code plus calls into the
//! runtime's south-bound interface (`fp_bind_field`, `fp_load_field`, ...).
//!
//! The scanner, parser, type elaborator, pipeline checker, and code emitter
//! are external collaborators; this crate consumes their outputs through the
//! interfaces in [`elaborate`] and [`pipeline`].

/// Contains the abstract syntax tree and its flattened storage.
pub mod ast;
/// Contains the error types and diagnostic rendering.
pub mod diagnostic;
/// Contains the elaborator interface consumed by lowering.
pub mod elaborate;
/// Contains the lowering pass.
pub mod lower;
/// Contains the pipeline-checker field-mapping interface.
pub mod pipeline;
/// Contains source identifiers, locations, and spans.
pub mod source_manager;
