use anyhow::{Context, Result, bail};

/// Seed used when none is given on the command line.
pub const DEFAULT_SEED: u64 = 1337;

/// Resolve a CLI seed argument into a numeric seed.
///
/// Supports decimal integers (negative values use their magnitude), `0x`
/// hexadecimal, and the keyword `random` for a fresh entropy-backed seed.
pub fn resolve_seed(token: &str) -> Result<u64> {
    let token = token.trim();
    if token.is_empty() {
        return Ok(DEFAULT_SEED);
    }

    if token.eq_ignore_ascii_case("random") {
        let seed = rand::random::<u64>();
        log::info!("generated random seed {seed}");
        return Ok(seed);
    }

    if let Some(hex) = token
        .strip_prefix("0x")
        .or_else(|| token.strip_prefix("0X"))
    {
        return u64::from_str_radix(hex, 16)
            .with_context(|| format!("invalid hexadecimal seed: {token}"));
    }

    if let Ok(value) = token.parse::<u64>() {
        return Ok(value);
    }

    if let Ok(value) = token.parse::<i64>() {
        return Ok(value.unsigned_abs());
    }

    bail!("Unrecognized seed token: {token}");
}
