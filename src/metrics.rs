use metrics::{counter, describe_counter};

/// Register metric descriptions (safe to call more than once)
pub fn init_metric_descriptions() {
    describe_counter!(
        "pricing_quotes_total",
        "Price calculations by outcome"
    );
    describe_counter!(
        "pricing_stale_results_total",
        "Calculation results discarded because newer input was issued"
    );
    describe_counter!(
        "pricing_table_writes_total",
        "Admin writes to the pricing catalog by result"
    );
}

/// Record a price calculation
pub fn record_quote(outcome: &'static str) {
    counter!("pricing_quotes_total", "outcome" => outcome).increment(1);
}

/// Record a discarded, superseded calculation result
pub fn record_stale_result() {
    counter!("pricing_stale_results_total").increment(1);
}

/// Record an admin write
pub fn record_table_write(result: &'static str) {
    counter!("pricing_table_writes_total", "result" => result).increment(1);
}
