//! SPU palette generation (spec.md §4.5).
//!
//! Combines the 4 colour indices selected by the control sequence with
//! the 4 alpha values (scaled 0..15 to 0..255). When the container
//! supplies an external 16-entry RGB palette (the VOBSUB `.idx` header),
//! each colour index is looked up there; otherwise a synthetic 4-level
//! greyscale ramp is used, keyed by how many of the 4 slots are opaque.

/// Scale a 4-bit alpha (0..15) to a full byte (0..255).
fn scale_alpha(a: u8) -> u8 {
    (a as u32 * 255 / 15) as u8
}

/// Greyscale fallback when no external palette is available: the
/// fewer opaque colours a sample uses, the more contrast between the
/// remaining levels (mirrors the reference decoder's heuristic of
/// spreading the used colours across the full luma range).
fn synth_grey(levels_used: usize, rank: usize) -> u8 {
    if levels_used <= 1 {
        return 0xFF;
    }
    ((rank * 255) / (levels_used - 1)) as u8
}

/// Build the 4-entry RGBA palette for one SPU, given the 4 palette
/// indices and 4 alphas from the control sequence, and an optional
/// external 16-entry RGB palette (index -> `[r,g,b]`).
pub fn build_palette(colors: [u8; 4], alphas: [u8; 4], external: Option<&[[u8; 3]; 16]>) -> Vec<[u8; 4]> {
    let opaque_count = alphas.iter().filter(|&&a| a > 0).count();
    let mut rank = 0usize;
    let mut out = Vec::with_capacity(4);
    for i in 0..4 {
        let alpha = scale_alpha(alphas[i]);
        let rgb = if let Some(pal) = external {
            let idx = (colors[i] & 0x0F) as usize;
            pal[idx]
        } else {
            let grey = if alpha > 0 {
                let g = synth_grey(opaque_count.max(1), rank);
                rank += 1;
                g
            } else {
                0
            };
            [grey, grey, grey]
        };
        out.push([rgb[0], rgb[1], rgb[2], alpha]);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fully_opaque_entry_scales_alpha_to_max() {
        let pal = build_palette([0, 1, 2, 3], [15, 0, 0, 0], None);
        assert_eq!(pal[0][3], 255);
        assert_eq!(pal[1][3], 0);
    }

    #[test]
    fn external_palette_is_looked_up_by_index() {
        let mut ext = [[0u8; 3]; 16];
        ext[5] = [10, 20, 30];
        let pal = build_palette([5, 0, 0, 0], [15, 0, 0, 0], Some(&ext));
        assert_eq!(pal[0], [10, 20, 30, 255]);
    }
}
