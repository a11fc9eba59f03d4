/// Render a sample as 16 binary digits, most significant bit first.
///
/// Used by trace logging to inspect fixed-point values.
pub fn format_bits(value: i16) -> String {
    (0..16)
        .rev()
        .map(|bit| if value & (1 << bit) != 0 { '1' } else { '0' })
        .collect()
}
