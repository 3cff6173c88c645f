use tracing::debug;

use crate::error::Result;
use crate::generator::assembler::{assemble, CompiledQuery};
use crate::generator::builder::{build_plan, BuildContext};
use crate::generator::validate::ensure_single_select;
use crate::parser::extractor::{extract_parameters, ParameterSet};

/// Build, render and validate the query described by `set`.
pub fn compile_query(set: &ParameterSet, ctx: &BuildContext<'_>) -> Result<CompiledQuery> {
    let plan = build_plan(set, ctx)?;
    let compiled = assemble(plan);
    ensure_single_select(&compiled.sql)?;
    debug!(sql = %compiled.sql, "compiled query");
    Ok(compiled)
}

/// Decode a raw model response and compile it.
pub fn compile_model_output(raw: &str, ctx: &BuildContext<'_>) -> Result<CompiledQuery> {
    let set = extract_parameters(raw)?;
    compile_query(&set, ctx)
}
