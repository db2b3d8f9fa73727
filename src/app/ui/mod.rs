mod controls;
mod details;
mod diagnostics;
mod panels;

pub(in crate::app) use diagnostics::FrameDiagnostics;
