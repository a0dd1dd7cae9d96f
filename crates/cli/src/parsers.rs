use std::fmt::Display;
use std::net::SocketAddr;
use std::str::FromStr;

fn parse_bounded_number<T>(s: &str, min: T, max: Option<T>) -> Result<T, String>
where
    T: Copy + PartialOrd + Display + FromStr,
    <T as FromStr>::Err: Display,
{
    let value = s
        .parse::<T>()
        .map_err(|err| format!("invalid number '{s}': {err}"))?;
    if value < min {
        return Err(format!("value must be at least {min}"));
    }
    if let Some(max_bound) = max
        && value > max_bound
    {
        return Err(format!("value must be at most {max_bound}"));
    }
    Ok(value)
}

/// Parse a positive `usize` (>= 1) from CLI input.
///
/// # Errors
/// Returns an error if the input string is not a valid number or is less than 1.
pub fn parse_positive_usize(s: &str) -> Result<usize, String> {
    parse_bounded_number(s, 1, None)
}

/// Parse a positive `u32` (>= 1) from CLI input.
///
/// # Errors
/// Returns an error if the input string is not a valid number or is less than 1.
pub fn parse_positive_u32(s: &str) -> Result<u32, String> {
    parse_bounded_number(s, 1, None)
}

/// Parse a frame dimension: even, within [2, 7680].
///
/// # Errors
/// Returns an error for odd or out-of-range values.
pub fn parse_even_dimension(s: &str) -> Result<u32, String> {
    let value = parse_bounded_number(s, 2, Some(7680))?;
    if value % 2 != 0 {
        return Err(format!("dimension must be even, got {value}"));
    }
    Ok(value)
}

/// Validate a `host:port` bind address without resolving host names.
///
/// # Errors
/// Returns an error when the port is missing or not a number.
pub fn parse_bind_addr(s: &str) -> Result<String, String> {
    if s.parse::<SocketAddr>().is_ok() {
        return Ok(s.to_string());
    }
    let (host, port) = s
        .rsplit_once(':')
        .ok_or_else(|| format!("expected host:port, got '{s}'"))?;
    if host.is_empty() {
        return Err(format!("missing host in '{s}'"));
    }
    port.parse::<u16>()
        .map_err(|e| format!("invalid port '{port}': {e}"))?;
    Ok(s.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positive_numbers() {
        assert_eq!(parse_positive_usize("20"), Ok(20));
        assert!(parse_positive_usize("0").is_err());
        assert!(parse_positive_u32("abc").is_err());
    }

    #[test]
    fn dimensions_must_be_even() {
        assert_eq!(parse_even_dimension("640"), Ok(640));
        assert!(parse_even_dimension("641").unwrap_err().contains("even"));
        assert!(parse_even_dimension("8000").is_err());
    }

    #[test]
    fn bind_addresses() {
        assert!(parse_bind_addr("127.0.0.1:5000").is_ok());
        assert!(parse_bind_addr("localhost:8080").is_ok());
        assert!(parse_bind_addr("[::1]:0").is_ok());
        assert!(parse_bind_addr("localhost").is_err());
        assert!(parse_bind_addr(":80").is_err());
        assert!(parse_bind_addr("host:http").is_err());
    }
}
