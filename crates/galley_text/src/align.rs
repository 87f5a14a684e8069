//! Inline alignment of laid out lines

use galley_core::{AreaError, AreaNode, InlineAlignment, InlineFillerArea, LineArea};

/// Distributes slack for alignments other than start, end and center
pub trait Justifier: Send + Sync {
    fn justify(
        &self,
        line: &mut LineArea,
        measure: f64,
        alignment: InlineAlignment,
    ) -> Result<(), AreaError>;
}

/// Leaves lines unchanged
#[derive(Clone, Copy, Debug, Default)]
pub struct NoJustify;

impl Justifier for NoJustify {
    fn justify(
        &self,
        _line: &mut LineArea,
        _measure: f64,
        _alignment: InlineAlignment,
    ) -> Result<(), AreaError> {
        Ok(())
    }
}

/// Align the content of `line` within `measure`.
///
/// Slack is filled with [`InlineFillerArea`]s: after the content for START,
/// before it for END, half on each side for CENTER. Other alignments go to
/// `justifier`. Content wider than `measure` is recorded as overflow.
/// Annotations do not count as content.
pub fn align_line(
    line: &mut LineArea,
    measure: f64,
    alignment: InlineAlignment,
    justifier: &dyn Justifier,
) -> Result<(), AreaError> {
    let slack = measure - line.content_ipd();
    if slack > 0.0 {
        match alignment {
            InlineAlignment::Start => line.add_child(filler(slack))?,
            InlineAlignment::End => line.insert_child(0, filler(slack))?,
            InlineAlignment::Center => {
                let half = slack / 2.0;
                line.insert_child(0, filler(half))?;
                line.add_child(filler(half))?;
            }
            _ => justifier.justify(line, measure, alignment)?,
        }
    } else if slack < 0.0 {
        line.set_overflow(-slack);
    }
    Ok(())
}

fn filler(ipd: f64) -> AreaNode {
    AreaNode::Filler(InlineFillerArea::new(ipd, 0.0))
}
