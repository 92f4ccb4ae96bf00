use bevy::prelude::*;

use super::ViewerShell;

/// Handle returned by [`FrameScheduler::request`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameCallbackId(u64);

/// Per-frame callback registry. A callback stays scheduled, firing once per
/// frame, until it is cancelled.
#[derive(Resource, Debug, Default)]
pub struct FrameScheduler {
    next_id: u64,
    scheduled: Vec<FrameCallbackId>,
}

impl FrameScheduler {
    pub fn request(&mut self) -> FrameCallbackId {
        self.next_id += 1;
        let id = FrameCallbackId(self.next_id);
        self.scheduled.push(id);
        id
    }

    /// Returns whether `id` was scheduled.
    pub fn cancel(&mut self, id: FrameCallbackId) -> bool {
        let before = self.scheduled.len();
        self.scheduled.retain(|scheduled| *scheduled != id);
        self.scheduled.len() != before
    }

    pub fn is_scheduled(&self, id: FrameCallbackId) -> bool {
        self.scheduled.contains(&id)
    }

    /// Number of callbacks still scheduled.
    pub fn pending(&self) -> usize {
        self.scheduled.len()
    }
}

/// Drive the active viewer's `update` for this frame.
pub fn run_frame_loop(world: &mut World) {
    if !world.contains_resource::<ViewerShell>() {
        return;
    }
    let dt = world
        .get_resource::<Time>()
        .map_or(0.0, |time| time.delta_secs());
    world.resource_scope(|world, mut shell: Mut<ViewerShell>| {
        shell.run_frame(world, dt);
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_unique_and_cancel_once() {
        let mut scheduler = FrameScheduler::default();
        let a = scheduler.request();
        let b = scheduler.request();
        assert_ne!(a, b);
        assert_eq!(scheduler.pending(), 2);

        assert!(scheduler.cancel(a));
        assert!(!scheduler.cancel(a));
        assert!(!scheduler.is_scheduled(a));
        assert!(scheduler.is_scheduled(b));
        assert_eq!(scheduler.pending(), 1);
    }
}
