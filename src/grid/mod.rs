pub mod aggregate;
pub mod exec;
pub mod html;
pub mod output;

pub use aggregate::aggregate;
pub use exec::exec;
pub use html::render_html;
pub use output::{render_json, render_terminal, TerminalStyle};

/// Number of color levels, including the empty level 0.
pub const LEVELS: u8 = 5;

/// Linear bucket of `count` against the largest cell: 0 stays at level 0,
/// anything up to a quarter of `max` is level 1, and so on up to level 4.
pub fn intensity_level(count: u32, max: u32) -> u8 {
    if count == 0 || max == 0 {
        return 0;
    }
    let ratio = count as f64 / max as f64;
    if ratio <= 0.25 {
        1
    } else if ratio <= 0.5 {
        2
    } else if ratio <= 0.75 {
        3
    } else {
        4
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn levels_scale_linearly_against_max() {
        assert_eq!(intensity_level(0, 8), 0);
        assert_eq!(intensity_level(1, 8), 1);
        assert_eq!(intensity_level(2, 8), 1);
        assert_eq!(intensity_level(3, 8), 2);
        assert_eq!(intensity_level(4, 8), 2);
        assert_eq!(intensity_level(6, 8), 3);
        assert_eq!(intensity_level(7, 8), 4);
        assert_eq!(intensity_level(8, 8), 4);
        assert_eq!(intensity_level(1, 1), 4);
        assert_eq!(intensity_level(0, 0), 0);
    }
}
