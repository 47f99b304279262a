/// Divides an accumulated sum by a count. Returns 0.0 when the count is 0.
pub fn average(sum: f64, count: usize) -> f64 {
    if count == 0 {
        return 0.0;
    }
    sum / count as f64
}

/// Share of `part` in `total`. Returns 0.0 when the total is 0.
pub fn proportion(part: usize, total: usize) -> f64 {
    average(part as f64, total)
}
