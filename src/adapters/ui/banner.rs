//! ASCII welcome banner with a vertical color gradient (MEDILINGUA).

use crossterm::ExecutableCommand;
use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};
use figlet_rs::FIGfont;
use std::io::{Write, stdout};

/// Medical Teal (#14b8a6).
const MEDICAL_TEAL: (u8, u8, u8) = (0x14, 0xb8, 0xa6);
/// Trust Blue (#3b82f6).
const TRUST_BLUE: (u8, u8, u8) = (0x3b, 0x82, 0xf6);

/// Linear interpolation between two RGB colors. `t` in [0.0, 1.0].
fn lerp_rgb(a: (u8, u8, u8), b: (u8, u8, u8), t: f64) -> (u8, u8, u8) {
    let r = (f64::from(a.0) * (1.0 - t) + f64::from(b.0) * t).round() as u8;
    let g = (f64::from(a.1) * (1.0 - t) + f64::from(b.1) * t).round() as u8;
    let bl = (f64::from(a.2) * (1.0 - t) + f64::from(b.2) * t).round() as u8;
    (r, g, bl)
}

/// Prints the welcome banner: "MEDILINGUA" in figlet ASCII with a
/// gradient from Medical Teal to Trust Blue, then version and tagline.
pub fn print_welcome() {
    let mut out = stdout();
    let Ok(font) = FIGfont::standard() else {
        let _ = out.execute(Print("MEDILINGUA\r\n"));
        return;
    };
    let Some(figure) = font.convert("MEDILINGUA") else {
        let _ = out.execute(Print("MEDILINGUA\r\n"));
        return;
    };
    let art = figure.to_string();
    let lines: Vec<&str> = art.lines().collect();
    let total = lines.len().max(1);

    for (i, line) in lines.iter().enumerate() {
        let t = if total <= 1 {
            1.0
        } else {
            i as f64 / (total - 1) as f64
        };
        let (r, g, b) = lerp_rgb(MEDICAL_TEAL, TRUST_BLUE, t);
        let _ = out.execute(SetForegroundColor(Color::Rgb { r, g, b }));
        let _ = out.execute(Print(line));
        let _ = out.execute(Print("\r\n"));
        let _ = out.execute(ResetColor);
    }

    let version = env!("CARGO_PKG_VERSION");
    let _ = out.execute(SetForegroundColor(Color::Rgb {
        r: TRUST_BLUE.0,
        g: TRUST_BLUE.1,
        b: TRUST_BLUE.2,
    }));
    let _ = out.execute(Print(format!("v{}\r\n", version)));
    let _ = out.execute(Print("Your multilingual health companion\r\n"));
    let _ = out.execute(ResetColor);
    let _ = out.flush();
}
