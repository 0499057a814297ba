use image::{Rgb, RgbImage};

// Synthetic 1366x768 screenshot: three glowing cards in the hand (two of
// them touching) and a light "3/10" counter block inside the built-in mana
// region.
fn main() -> anyhow::Result<()> {
    let mut img = RgbImage::new(1366, 768);

    // Fill with a gradient
    for y in 0..768 {
        for x in 0..1366 {
            let r = (x * 60 / 1366) as u8;
            let g = (y * 40 / 768) as u8;
            let b = 50;
            img.put_pixel(x, y, Rgb([r, g, b]));
        }
    }

    let glow = Rgb([40, 230, 60]);
    for (x0, width) in [(420u32, 96u32), (520, 96), (700, 96)] {
        for y in 600..740 {
            for x in x0..x0 + width {
                img.put_pixel(x, y, glow);
            }
        }
    }

    for y in 425..452 {
        for x in 1236..1276 {
            img.put_pixel(x, y, Rgb([235, 235, 235]));
        }
    }

    img.save("test_hand.png")?;
    println!("Created test_hand.png (1366x768, 3 playable cards)");
    Ok(())
}
