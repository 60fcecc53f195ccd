// Picking which decoded sizes to export

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use super::wincur::CursorImage;
use super::wincur::dib::MAX_DIMENSION;
use crate::error::{CursorError, Result};

/// Which sizes of a multi-size cursor to export.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SizeFilter {
    #[default]
    All,
    LargestOnly,
    /// Requested sizes; missing ones are rescaled from the closest available.
    Specific(Vec<u32>),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseSizeFilterError {
    #[error("Size list is empty")]
    Empty,
    #[error("Invalid size '{0}' (expected an integer from 1 to 1024)")]
    InvalidSize(String),
}

impl FromStr for SizeFilter {
    type Err = ParseSizeFilterError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let s = s.trim();
        match s.to_ascii_lowercase().as_str() {
            "all" => return Ok(SizeFilter::All),
            "max" | "largest" | "largest_only" => return Ok(SizeFilter::LargestOnly),
            _ => {}
        }

        let sizes = s
            .split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(|part| match part.parse::<u32>() {
                Ok(size) if (1..=MAX_DIMENSION).contains(&size) => Ok(size),
                _ => Err(ParseSizeFilterError::InvalidSize(part.to_string())),
            })
            .collect::<std::result::Result<Vec<_>, _>>()?;

        if sizes.is_empty() {
            return Err(ParseSizeFilterError::Empty);
        }
        Ok(SizeFilter::Specific(sizes))
    }
}

impl fmt::Display for SizeFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SizeFilter::All => write!(f, "all"),
            SizeFilter::LargestOnly => write!(f, "max"),
            SizeFilter::Specific(sizes) => {
                let list: Vec<String> = sizes.iter().map(u32::to_string).collect();
                write!(f, "{}", list.join(","))
            }
        }
    }
}

impl SizeFilter {
    /// Requested sizes with duplicates removed, first occurrence kept.
    pub fn targets(&self) -> Vec<u32> {
        match self {
            SizeFilter::Specific(sizes) => {
                let mut targets = Vec::with_capacity(sizes.len());
                for &size in sizes {
                    if !targets.contains(&size) {
                        targets.push(size);
                    }
                }
                targets
            }
            _ => Vec::new(),
        }
    }
}

/// One selected source image and the size it is exported at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SizePick {
    pub index: usize,
    pub target_size: u32,
    pub rescale: bool,
}

pub fn nominal_size(image: &CursorImage) -> u32 {
    image.nominal_size()
}

pub fn find_exact_size_index(images: &[CursorImage], target_size: u32) -> Option<usize> {
    images.iter().position(|img| nominal_size(img) == target_size)
}

/// Index with the smallest size difference; earliest wins ties.
pub fn find_closest_size_index(images: &[CursorImage], target_size: u32) -> Option<usize> {
    images
        .iter()
        .enumerate()
        .min_by_key(|(_, img)| nominal_size(img).abs_diff(target_size))
        .map(|(idx, _)| idx)
}

fn find_largest_index(images: &[CursorImage]) -> Option<usize> {
    images
        .iter()
        .enumerate()
        .fold(None, |best: Option<(usize, u32)>, (idx, img)| {
            let size = nominal_size(img);
            match best {
                Some((_, best_size)) if best_size >= size => best,
                _ => Some((idx, size)),
            }
        })
        .map(|(idx, _)| idx)
}

/// Resolve a filter against a list of images of the same cursor.
pub fn select_sizes(images: &[CursorImage], filter: &SizeFilter) -> Vec<SizePick> {
    match filter {
        SizeFilter::All => images
            .iter()
            .enumerate()
            .map(|(index, img)| SizePick {
                index,
                target_size: nominal_size(img),
                rescale: false,
            })
            .collect(),
        SizeFilter::LargestOnly => find_largest_index(images)
            .map(|index| SizePick {
                index,
                target_size: nominal_size(&images[index]),
                rescale: false,
            })
            .into_iter()
            .collect(),
        SizeFilter::Specific(_) => filter
            .targets()
            .into_iter()
            .filter_map(|target_size| {
                if let Some(index) = find_exact_size_index(images, target_size) {
                    return Some(SizePick {
                        index,
                        target_size,
                        rescale: false,
                    });
                }
                find_closest_size_index(images, target_size).map(|index| SizePick {
                    index,
                    target_size,
                    rescale: true,
                })
            })
            .collect(),
    }
}

/// Distinct source indices a filter touches, in selection order.
pub fn select_size_indices(images: &[CursorImage], filter: &SizeFilter) -> Vec<usize> {
    let mut indices = Vec::new();
    for pick in select_sizes(images, filter) {
        if !indices.contains(&pick.index) {
            indices.push(pick.index);
        }
    }
    indices
}

/// Largest image among the selected ones.
pub fn choose_preview_index(images: &[CursorImage], filter: &SizeFilter) -> Result<usize> {
    let indices = select_size_indices(images, filter);
    let first = *indices.first().ok_or(CursorError::NoImagesSelected)?;

    Ok(indices.into_iter().fold(first, |best, idx| {
        if nominal_size(&images[idx]) > nominal_size(&images[best]) {
            idx
        } else {
            best
        }
    }))
}
