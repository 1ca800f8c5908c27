//! `motion-runtime` – glue between the motion losses and the process that
//! trains or evaluates with them.
//!
//! # Modules
//!
//! - [`evaluator`] – [`MotionLossEvaluator`][evaluator::MotionLossEvaluator]:
//!   evaluates detection and camera batches with a
//!   [`LossConfig`][motion_types::LossConfig] and summarises them as a
//!   [`LossReport`][evaluator::LossReport].
//! - [`telemetry`] – [`init_tracing`][telemetry::init_tracing]:
//!   initialises the global `tracing` subscriber with an optional OTLP span
//!   exporter.  Set `OTEL_EXPORTER_OTLP_ENDPOINT` to enable trace export.

pub mod evaluator;
pub mod telemetry;

pub use evaluator::{LossReport, MotionLossEvaluator};
pub use telemetry::{LogFormat, TracerProviderGuard, init_tracing};
