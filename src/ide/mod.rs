//! IDE features: high-level APIs for editor integrations.
//!
//! This module sits between the semantic model (HIR) and a language server.
//! It owns the session state ([`AnalysisHost`]) and answers queries through
//! [`Analysis`]:
//!
//! ```ignore
//! use layout_semantics::ide::AnalysisHost;
//!
//! let mut host = AnalysisHost::new(schema);
//! let id = host.set_file_content("UI/GameUI.SC2Layout", text)?;
//!
//! let mut analysis = host.analysis();
//! let diagnostics = analysis.check_file(id);
//! let symbols = analysis.document_symbols(id);
//! let targets = analysis.goto_definition(id, offset);
//! ```

mod analysis;
mod goto;
mod symbols;

pub use analysis::{Analysis, AnalysisHost};
pub use goto::{GotoResult, GotoTarget, goto_definition};
pub use symbols::{SymbolInfo, SymbolKind, document_symbols, workspace_symbols};
