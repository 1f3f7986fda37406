//! Pointer gestures on placements.
//!
//! A gesture goes `Idle -> Active -> Idle`. At begin the placement is
//! snapshotted as the baseline and one undo snapshot is recorded. Every update
//! recomputes a preview from the baseline, so resizing and rotating never
//! compound. The preview is committed to the session when the gesture ends;
//! cancelling drops it and takes the undo snapshot back out. While a gesture
//! is open its page cannot be saved.
//!
//! Resizing scales the width by the ratio of the pointer's current to initial
//! distance from the placement center.

use crate::history::SnapshotToken;
use crate::placement::{Placement, PlacementField, PlacementId, PlacementLimits};
use crate::session::EditingSession;
use crate::viewport::{Corner, Handle, PageTransform};
use inkstamp_core::constants::{DEFAULT_HANDLE_TOLERANCE_PX, EPSILON};
use inkstamp_core::{PlacementError, Point, Result};

/// What an active gesture does, with the values captured at its start.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GestureKind {
    /// Drag the body. Keeps the pointer's offset from the center.
    Move { grab_offset: Point },
    /// Drag a corner handle.
    Resize {
        corner: Corner,
        base_width: f64,
        /// Pointer distance from the center at start, in screen pixels.
        initial: f64,
    },
    /// Drag the rotation handle.
    Rotate { base_rotation: f64, start_angle: f64 },
}

impl GestureKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Move { .. } => "move",
            Self::Resize { .. } => "resize",
            Self::Rotate { .. } => "rotate",
        }
    }
}

/// A running gesture.
#[derive(Debug, Clone)]
pub struct ActiveGesture {
    page: usize,
    kind: GestureKind,
    baseline: Placement,
    preview: Placement,
    limits: PlacementLimits,
    token: SnapshotToken,
}

impl ActiveGesture {
    pub fn page(&self) -> usize {
        self.page
    }

    pub fn kind(&self) -> &GestureKind {
        &self.kind
    }

    /// The placement as it was when the gesture began.
    pub fn baseline(&self) -> &Placement {
        &self.baseline
    }

    /// The placement as the gesture currently shows it.
    pub fn preview(&self) -> &Placement {
        &self.preview
    }
}

#[derive(Debug, Clone, Default)]
pub enum GestureState {
    #[default]
    Idle,
    Active(Box<ActiveGesture>),
}

/// Turns pointer input into placement changes.
#[derive(Debug, Clone)]
pub struct GestureController {
    state: GestureState,
    tolerance: f64,
}

impl Default for GestureController {
    fn default() -> Self {
        Self::new(DEFAULT_HANDLE_TOLERANCE_PX)
    }
}

impl GestureController {
    /// `tolerance` is the handle grab radius in screen pixels.
    pub fn new(tolerance: f64) -> Self {
        Self {
            state: GestureState::Idle,
            tolerance,
        }
    }

    pub fn state(&self) -> &GestureState {
        &self.state
    }

    pub fn is_active(&self) -> bool {
        matches!(self.state, GestureState::Active(_))
    }

    pub fn active(&self) -> Option<&ActiveGesture> {
        match &self.state {
            GestureState::Active(gesture) => Some(&**gesture),
            GestureState::Idle => None,
        }
    }

    pub fn preview(&self) -> Option<&Placement> {
        self.active().map(|g| &g.preview)
    }

    /// Starts whatever gesture lies under the pointer.
    ///
    /// The active placement's rotation handle wins over its corners, which
    /// win over any placement body (topmost first). The hit placement becomes
    /// active. Returns `None` when nothing was hit.
    pub fn begin_at(
        &mut self,
        session: &mut EditingSession,
        page: usize,
        pointer: Point,
        transform: &PageTransform,
    ) -> Result<Option<Handle>> {
        self.ensure_idle()?;
        if session.is_locked(page) {
            tracing::warn!("Rejecting gesture on page {}: save in progress", page);
            return Err(PlacementError::PageLocked { page }.into());
        }
        let Some(editor) = session.page(page) else {
            return Ok(None);
        };

        let handle_hit = editor.active().and_then(|active| {
            match transform.hit_test(active, pointer, self.tolerance) {
                Some(handle @ (Handle::Rotate | Handle::Corner(_))) => Some((active.id, handle)),
                _ => None,
            }
        });

        let hit = handle_hit.or_else(|| {
            editor
                .placements()
                .iter()
                .rev()
                .find(|p| transform.placement_screen_rect(p).contains(pointer))
                .map(|p| (p.id, Handle::Body))
        });

        match hit {
            Some((id, handle)) => {
                self.begin(session, page, id, handle, pointer, transform)?;
                Ok(Some(handle))
            }
            None => Ok(None),
        }
    }

    /// Starts a gesture on a known placement and handle.
    pub fn begin(
        &mut self,
        session: &mut EditingSession,
        page: usize,
        id: PlacementId,
        handle: Handle,
        pointer: Point,
        transform: &PageTransform,
    ) -> Result<()> {
        self.ensure_idle()?;
        if session.is_locked(page) {
            tracing::warn!("Rejecting gesture on page {}: save in progress", page);
            return Err(PlacementError::PageLocked { page }.into());
        }
        let baseline = match session.page(page) {
            None => return Err(PlacementError::UnknownPage { page }.into()),
            Some(editor) => editor
                .get(id)
                .cloned()
                .ok_or(PlacementError::UnknownPlacement { page, id })?,
        };

        let kind = match handle {
            Handle::Body => GestureKind::Move {
                grab_offset: transform.to_normalized(pointer) - baseline.center,
            },
            Handle::Corner(corner) => {
                let rect = transform.placement_screen_rect(&baseline);
                GestureKind::Resize {
                    corner,
                    base_width: baseline.width_ratio,
                    initial: rect.to_local(pointer).length(),
                }
            }
            Handle::Rotate => {
                let pivot = transform.to_screen(baseline.center);
                GestureKind::Rotate {
                    base_rotation: baseline.rotation,
                    start_angle: pivot.angle_to(&pointer),
                }
            }
        };

        session.set_active(page, Some(id))?;
        let token = session.register_snapshot(page)?;
        session.open_gesture(page);
        tracing::debug!("Begin {} gesture on placement {} (page {})", kind.name(), id, page);

        self.state = GestureState::Active(Box::new(ActiveGesture {
            page,
            kind,
            preview: baseline.clone(),
            baseline,
            limits: session.options().limits,
            token,
        }));
        Ok(())
    }

    /// Feeds a pointer position. Returns the updated preview, `None` when
    /// no gesture is active.
    pub fn update(&mut self, pointer: Point, transform: &PageTransform) -> Option<&Placement> {
        let GestureState::Active(gesture) = &mut self.state else {
            return None;
        };
        let page_size = transform.page_size();
        let mut next = gesture.baseline.clone();

        match gesture.kind {
            GestureKind::Move { grab_offset } => {
                let center = transform.to_normalized(pointer) - grab_offset;
                next.apply(PlacementField::Center(center), page_size, &gesture.limits);
            }
            GestureKind::Resize {
                base_width,
                initial,
                ..
            } => {
                // distance in the unrotated frame; direction does not matter
                let rect = transform.placement_screen_rect(&gesture.baseline);
                let current = rect.to_local(pointer).length();
                let ratio = if initial > EPSILON {
                    current / initial
                } else {
                    1.0
                };
                next.apply(
                    PlacementField::WidthRatio(base_width * ratio),
                    page_size,
                    &gesture.limits,
                );
            }
            GestureKind::Rotate {
                base_rotation,
                start_angle,
            } => {
                let pivot = transform.to_screen(gesture.baseline.center);
                let angle = pivot.angle_to(&pointer);
                next.apply(
                    PlacementField::Rotation(base_rotation + (angle - start_angle)),
                    page_size,
                    &gesture.limits,
                );
            }
        }

        gesture.preview = next;
        Some(&gesture.preview)
    }

    /// Ends the gesture and commits the preview to the session.
    ///
    /// A gesture that changed nothing leaves no history entry.
    pub fn end(&mut self, session: &mut EditingSession) -> Result<Option<Placement>> {
        let GestureState::Active(gesture) = std::mem::take(&mut self.state) else {
            return Ok(None);
        };
        let ActiveGesture {
            page,
            kind,
            baseline,
            preview,
            token,
            ..
        } = *gesture;
        session.close_gesture(page);

        if preview == baseline {
            tracing::debug!("End {} gesture on {}: unchanged", kind.name(), baseline.id);
            session.revert_snapshot(page, token)?;
            return Ok(Some(baseline));
        }

        let id = preview.id;
        let field = match kind {
            GestureKind::Move { .. } => PlacementField::Center(preview.center),
            GestureKind::Resize { .. } => PlacementField::WidthRatio(preview.width_ratio),
            GestureKind::Rotate { .. } => PlacementField::Rotation(preview.rotation),
        };
        // a resize can also shift the center inward
        let committed = session
            .mutate(page, id, field)
            .and_then(|_| session.mutate(page, id, PlacementField::Center(preview.center)));

        match committed {
            Ok(committed) => {
                tracing::debug!("End {} gesture on {} at {}", kind.name(), id, committed.center);
                Ok(Some(committed))
            }
            Err(e) => {
                tracing::warn!("Dropping {} gesture on {}: {}", kind.name(), id, e);
                if let Err(revert) = session.revert_snapshot(page, token) {
                    tracing::warn!("Gesture snapshot on page {} not reverted: {}", page, revert);
                }
                Err(e)
            }
        }
    }

    /// Abandons the gesture. The placement keeps its baseline and the undo
    /// snapshot taken at begin is removed.
    pub fn cancel(&mut self, session: &mut EditingSession) -> Result<()> {
        let GestureState::Active(gesture) = std::mem::take(&mut self.state) else {
            return Ok(());
        };
        tracing::debug!(
            "Cancel {} gesture on {}",
            gesture.kind.name(),
            gesture.baseline.id
        );
        session.close_gesture(gesture.page);
        session.revert_snapshot(gesture.page, gesture.token)
    }

    /// The page's placements with the gesture preview substituted, for
    /// drawing while a gesture runs.
    pub fn overlay(&self, page: usize, placements: &[Placement]) -> Vec<Placement> {
        let preview = self.active().filter(|g| g.page == page).map(|g| &g.preview);
        placements
            .iter()
            .map(|p| match preview {
                Some(preview) if preview.id == p.id => preview.clone(),
                _ => p.clone(),
            })
            .collect()
    }

    fn ensure_idle(&self) -> Result<()> {
        match self.active() {
            Some(gesture) => Err(PlacementError::GestureInProgress {
                active: gesture.kind.name().to_string(),
            }
            .into()),
            None => Ok(()),
        }
    }
}
