//! Read-only transformed views over a Partial.

use crate::breakpoint::Breakpoint;
use crate::partial::Partial;

/// A restartable sequence of a Partial's breakpoints passed through a
/// per-breakpoint transform. Nothing is materialized; every call to
/// [`BreakpointView::iter`] starts a fresh traversal.
#[derive(Debug, Clone, Copy)]
pub struct BreakpointView<'a, F> {
    partial: &'a Partial,
    transform: F,
}

impl<'a, F> BreakpointView<'a, F>
where
    F: Fn(&Breakpoint) -> Breakpoint,
{
    /// Creates a view of `partial` through `transform`.
    pub fn new(partial: &'a Partial, transform: F) -> Self {
        Self { partial, transform }
    }

    /// Iterates over the transformed breakpoints.
    pub fn iter(&self) -> impl Iterator<Item = Breakpoint> + '_ {
        self.partial.iter().map(&self.transform)
    }

    /// Label of the underlying Partial.
    pub fn label(&self) -> u32 {
        self.partial.label()
    }

    /// Number of breakpoints in the view.
    pub fn len(&self) -> usize {
        self.partial.len()
    }

    /// True if the underlying Partial is a dummy.
    pub fn is_empty(&self) -> bool {
        self.partial.is_empty()
    }

    /// Materializes the view as a new Partial with the same label.
    ///
    /// Transforms that reorder times are resolved by insertion order: a
    /// later breakpoint at an existing time replaces the earlier one.
    pub fn to_partial(&self) -> Partial {
        let mut out = Partial::with_label(self.partial.label());
        for bp in self.iter() {
            out.insert(bp);
        }
        out
    }
}

/// A view that scales every amplitude by `gain`.
pub fn scaled_amplitude(
    partial: &Partial,
    gain: f64,
) -> BreakpointView<'_, impl Fn(&Breakpoint) -> Breakpoint> {
    BreakpointView::new(partial, move |bp: &Breakpoint| bp.with_amplitude(bp.amplitude * gain))
}

/// A view that shifts every breakpoint time by `offset` seconds.
pub fn time_shifted(
    partial: &Partial,
    offset: f64,
) -> BreakpointView<'_, impl Fn(&Breakpoint) -> Breakpoint> {
    BreakpointView::new(partial, move |bp: &Breakpoint| bp.at_time(bp.time + offset))
}
