/// Naming used for the handles a GEMM lowering creates. Names only affect
/// rendering; every lowering gets fresh handles regardless.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoweringOptions {
    /// Loop over result rows.
    pub row_var: String,
    /// Loop over result columns.
    pub col_var: String,
    /// Reduction loop.
    pub reduction_var: String,
    /// Per-element scalar accumulator.
    pub accumulator: String,
}

impl Default for LoweringOptions {
    fn default() -> Self {
        Self {
            row_var: "n".to_string(),
            col_var: "m".to_string(),
            reduction_var: "k".to_string(),
            accumulator: "acc".to_string(),
        }
    }
}
