//! [`BoxLayout`]: arranges widgets in a row or column with taffy flexbox.
//!
//! The layout only consumes the widget layout contract: every item is
//! described by its [`LayoutFlags`], preferred size and stretch factor, and
//! the result is one rectangle per item in the container's client
//! coordinates.

use taffy::prelude::*;

use super::LayoutFlags;
use crate::error::{Error, Result};
use crate::geometry::{Margins, Rectangle, Size};

/// Direction a [`BoxLayout`] stacks its items in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Orientation {
    #[default]
    Horizontal,
    Vertical,
}

/// What the layout knows about one widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayoutItem {
    pub flags: LayoutFlags,
    pub preferred: Size,
    pub stretch: u32,
}

/// Stacks items along one axis.
///
/// Along the main axis every item starts at its preferred size; surplus
/// space goes to greedy items when there are any, otherwise to growable
/// ones, weighted by stretch factor. Only shrinkable items give up space
/// when there is too little. Across the main axis growable items fill the
/// container and the rest keep their preferred size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BoxLayout {
    orientation: Orientation,
    spacing: i32,
    margins: Margins,
}

impl BoxLayout {
    pub fn new(orientation: Orientation) -> Self {
        Self {
            orientation,
            spacing: 0,
            margins: Margins::ZERO,
        }
    }

    pub fn horizontal() -> Self {
        Self::new(Orientation::Horizontal)
    }

    pub fn vertical() -> Self {
        Self::new(Orientation::Vertical)
    }

    /// Gap between neighbouring items (builder).
    pub fn with_spacing(mut self, spacing: i32) -> Self {
        self.spacing = spacing;
        self
    }

    /// Space between the container edge and the items (builder).
    pub fn with_margins(mut self, margins: Margins) -> Self {
        self.margins = margins;
        self
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    /// Compute one rectangle per item for a container of `area`.
    pub fn arrange(&self, area: Size, items: &[LayoutItem]) -> Result<Vec<Rectangle>> {
        let horizontal = self.orientation == Orientation::Horizontal;
        let (grow_main, grow_cross, greedy_main, shrink_main) = if horizontal {
            (
                LayoutFlags::GROWABLE_HORZ,
                LayoutFlags::GROWABLE_VERT,
                LayoutFlags::GREEDY_HORZ,
                LayoutFlags::SHRINKABLE_HORZ,
            )
        } else {
            (
                LayoutFlags::GROWABLE_VERT,
                LayoutFlags::GROWABLE_HORZ,
                LayoutFlags::GREEDY_VERT,
                LayoutFlags::SHRINKABLE_VERT,
            )
        };
        let any_greedy = items.iter().any(|item| item.flags.contains(greedy_main));

        let mut tree: TaffyTree<()> = TaffyTree::new();
        let mut leaves = Vec::with_capacity(items.len());
        for item in items {
            let (main, cross) = if horizontal {
                (item.preferred.width, item.preferred.height)
            } else {
                (item.preferred.height, item.preferred.width)
            };
            let grows = if any_greedy {
                item.flags.contains(greedy_main)
            } else {
                item.flags.contains(grow_main)
            };
            let shrinks = item.flags.contains(shrink_main);
            let fills_cross = item.flags.contains(grow_cross);

            let main_min = if shrinks { 0.0 } else { main.max(0) as f32 };
            let cross_size = if fills_cross {
                Dimension::AUTO
            } else {
                Dimension::from_length(cross.max(0) as f32)
            };
            let (size, min_size) = if horizontal {
                (
                    taffy::geometry::Size { width: Dimension::AUTO, height: cross_size },
                    taffy::geometry::Size { width: Dimension::from_length(main_min), height: Dimension::AUTO },
                )
            } else {
                (
                    taffy::geometry::Size { width: cross_size, height: Dimension::AUTO },
                    taffy::geometry::Size { width: Dimension::AUTO, height: Dimension::from_length(main_min) },
                )
            };

            let style = Style {
                flex_basis: Dimension::from_length(main.max(0) as f32),
                flex_grow: if grows { item.stretch.max(1) as f32 } else { 0.0 },
                flex_shrink: if shrinks { 1.0 } else { 0.0 },
                align_self: if fills_cross { Some(AlignSelf::Stretch) } else { Some(AlignSelf::FlexStart) },
                size,
                min_size,
                ..Default::default()
            };
            leaves.push(tree.new_leaf(style).map_err(layout_error)?);
        }

        let gap = LengthPercentage::from_length(self.spacing.max(0) as f32);
        let container = Style {
            flex_direction: if horizontal { FlexDirection::Row } else { FlexDirection::Column },
            size: taffy::geometry::Size {
                width: Dimension::from_length(area.width.max(0) as f32),
                height: Dimension::from_length(area.height.max(0) as f32),
            },
            gap: taffy::geometry::Size { width: gap, height: gap },
            padding: taffy::geometry::Rect {
                top: LengthPercentage::from_length(self.margins.top as f32),
                right: LengthPercentage::from_length(self.margins.right as f32),
                bottom: LengthPercentage::from_length(self.margins.bottom as f32),
                left: LengthPercentage::from_length(self.margins.left as f32),
            },
            ..Default::default()
        };
        let root = tree.new_with_children(container, &leaves).map_err(layout_error)?;
        tree.compute_layout(
            root,
            taffy::geometry::Size {
                width: AvailableSpace::Definite(area.width.max(0) as f32),
                height: AvailableSpace::Definite(area.height.max(0) as f32),
            },
        )
        .map_err(layout_error)?;

        leaves
            .iter()
            .map(|&leaf| {
                let layout = tree.layout(leaf).map_err(layout_error)?;
                Ok(Rectangle::new(
                    layout.location.x.round() as i32,
                    layout.location.y.round() as i32,
                    layout.size.width.round() as i32,
                    layout.size.height.round() as i32,
                ))
            })
            .collect()
    }
}

fn layout_error(err: taffy::TaffyError) -> Error {
    Error::Layout(err.to_string())
}
