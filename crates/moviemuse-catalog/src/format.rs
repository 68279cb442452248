/// "136" minutes -> "2h 16m"
pub fn format_runtime(minutes: u32) -> String {
    let h = minutes / 60;
    let m = minutes % 60;
    format!("{}h {}m", h, m)
}

/// Vote averages render with one decimal place everywhere
pub fn format_rating(rating: f64) -> String {
    format!("{:.1}", rating)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_runtime() {
        assert_eq!(format_runtime(136), "2h 16m");
        assert_eq!(format_runtime(45), "0h 45m");
    }

    #[test]
    fn test_format_rating() {
        assert_eq!(format_rating(8.234), "8.2");
        assert_eq!(format_rating(7.0), "7.0");
    }
}
