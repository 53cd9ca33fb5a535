use std::convert::TryFrom;
use std::path::Path;
use image::{ImageBuffer, ImageError, Rgb, RgbImage};
use thiserror::Error;
use crate::grid::CellGrid;

#[derive(Debug, Error)]
pub enum ExportError {
  #[error("invalid color {0:?}, expected #rrggbb or #rgb")]
  InvalidColor(String),
  #[error("a {width}x{height} grid at {cell_size}px per cell is too large to rasterize")]
  TooLarge {
    width: usize,
    height: usize,
    cell_size: u32,
  },
  #[error(transparent)]
  Image(#[from] ImageError),
}

/// Paint every cell as a `cell_size` x `cell_size` block.
pub fn rasterize(
  grid: &CellGrid,
  cell_size: u32,
  alive: Rgb<u8>,
  dead: Rgb<u8>,
) -> Result<RgbImage, ExportError> {
  let too_large = || ExportError::TooLarge {
    width: grid.width(),
    height: grid.height(),
    cell_size,
  };
  let w = scaled(grid.width(), cell_size).ok_or_else(too_large)?;
  let h = scaled(grid.height(), cell_size).ok_or_else(too_large)?;

  Ok(ImageBuffer::from_fn(w, h, |x, y| {
    let row = (y / cell_size) as usize;
    let col = (x / cell_size) as usize;
    if grid.is_alive(row, col) {
      alive
    } else {
      dead
    }
  }))
}

fn scaled(cells: usize, cell_size: u32) -> Option<u32> {
  let cells = u32::try_from(cells).ok()?;
  cells.checked_mul(cell_size)
}

pub fn save_png(
  grid: &CellGrid,
  path: impl AsRef<Path>,
  cell_size: u32,
  alive: Rgb<u8>,
  dead: Rgb<u8>,
) -> Result<(), ExportError> {
  let image = rasterize(grid, cell_size, alive, dead)?;
  image.save_with_format(path, image::ImageFormat::Png)?;
  Ok(())
}

/// Parse `#rrggbb` or `#rgb`.
pub fn parse_hex_color(src: &str) -> Result<Rgb<u8>, ExportError> {
  let invalid = || ExportError::InvalidColor(src.to_owned());
  let hex = src.strip_prefix('#').unwrap_or(src);
  if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
    return Err(invalid());
  }
  let channel = |s: &str| u8::from_str_radix(s, 16).map_err(|_| invalid());
  match hex.len() {
    6 => Ok(Rgb([channel(&hex[0..2])?, channel(&hex[2..4])?, channel(&hex[4..6])?])),
    3 => {
      let short = |i: usize| channel(&hex[i..i + 1]).map(|v| v * 17);
      Ok(Rgb([short(0)?, short(1)?, short(2)?]))
    }
    _ => Err(invalid()),
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn colors() {
    assert_eq!(parse_hex_color("#06b6d4").unwrap(), Rgb([0x06, 0xb6, 0xd4]));
    assert_eq!(parse_hex_color("fff").unwrap(), Rgb([255, 255, 255]));
    assert!(parse_hex_color("#12345").is_err());
    assert!(parse_hex_color("#gg0000").is_err());
  }

  #[test]
  fn cells_become_blocks() {
    let grid: CellGrid = "#.\n.#".parse().unwrap();
    let black = Rgb([0, 0, 0]);
    let white = Rgb([255, 255, 255]);
    let image = rasterize(&grid, 3, black, white).unwrap();
    assert_eq!(image.dimensions(), (6, 6));
    assert_eq!(*image.get_pixel(0, 0), black);
    assert_eq!(*image.get_pixel(2, 2), black);
    assert_eq!(*image.get_pixel(3, 0), white);
    assert_eq!(*image.get_pixel(5, 5), black);
  }
}
