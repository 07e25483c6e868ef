//! The editing session: live state plus every operation that mutates it.

use image::RgbaImage;
use montage_compositor::Compositor;
use montage_core::limits::{HISTORY_CAPACITY, PROJECT_MIN_DURATION, PROJECT_TAIL_PADDING};
use montage_core::{MontageError, Result};
use montage_media::{source::BoundPool, FrameSink, FrameSource, MediaPool};
use montage_timeline::{
    Asset, AssetKind, AssetRegistry, Clip, ClipProperties, History, Snapshot, TextStyle, Track,
};
use tracing::{debug, info};
use uuid::Uuid;

use crate::export::{self, ExportCancel, ExportOutcome, SeekWait};
use crate::gesture::{self, DragMode, DragSession, ViewMetrics};
use crate::playback::PlaybackClock;
use crate::snap;

/// A single local editing session.
///
/// Owns the asset registry, the live (clips, tracks) state, the bounded
/// snapshot history, the playback clock, and the in-flight drag gesture.
/// All mutation is serialized through `&mut self`; there is no hidden
/// global state anywhere in the session.
pub struct EditorSession {
    assets: AssetRegistry,
    tracks: Vec<Track>,
    clips: Vec<Clip>,
    selection: Option<Uuid>,
    history: History,
    clock: PlaybackClock,
    drag: Option<DragSession>,
    view: ViewMetrics,
    pool: MediaPool,
    exporting: bool,
}

impl EditorSession {
    /// Create a session with the fixed initial track set.
    pub fn new() -> Self {
        let tracks = Track::default_lanes();
        let history = History::new(HISTORY_CAPACITY, Snapshot::capture(&[], &tracks));
        Self {
            assets: AssetRegistry::new(),
            tracks,
            clips: Vec::new(),
            selection: None,
            history,
            clock: PlaybackClock::new(),
            drag: None,
            view: ViewMetrics::default(),
            pool: MediaPool::new(),
            exporting: false,
        }
    }

    // ── Accessors ────────────────────────────────────────────────

    pub fn clips(&self) -> &[Clip] {
        &self.clips
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn assets(&self) -> &AssetRegistry {
        &self.assets
    }

    pub fn selection(&self) -> Option<Uuid> {
        self.selection
    }

    pub fn playhead(&self) -> f64 {
        self.clock.position()
    }

    pub fn is_playing(&self) -> bool {
        self.clock.is_playing()
    }

    pub fn is_exporting(&self) -> bool {
        self.exporting
    }

    pub fn view(&self) -> &ViewMetrics {
        &self.view
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Find a clip by id.
    pub fn clip(&self, id: Uuid) -> Option<&Clip> {
        self.clips.iter().find(|c| c.id == id)
    }

    fn clip_mut(&mut self, id: Uuid) -> Option<&mut Clip> {
        self.clips.iter_mut().find(|c| c.id == id)
    }

    fn track(&self, id: Uuid) -> Option<&Track> {
        self.tracks.iter().find(|t| t.id == id)
    }

    /// Derived project duration: at least the minimum, else padding past
    /// the last clip's end.
    pub fn project_duration(&self) -> f64 {
        let last_end = self
            .clips
            .iter()
            .map(Clip::end_time)
            .fold(0.0_f64, f64::max);
        PROJECT_MIN_DURATION.max(last_end + PROJECT_TAIL_PADDING)
    }

    // ── Asset boundary ───────────────────────────────────────────

    /// Register media produced by an import or generation collaborator.
    pub fn add_asset(
        &mut self,
        kind: AssetKind,
        source: impl Into<String>,
        name: impl Into<String>,
        natural_duration: Option<f64>,
    ) -> Uuid {
        self.assets.add(kind, source, name, natural_duration)
    }

    /// Probe callback: fill in a video asset's natural duration once.
    pub fn set_asset_duration(&mut self, asset_id: Uuid, seconds: f64) {
        self.assets.set_natural_duration(asset_id, seconds);
    }

    /// Look up an asset record.
    pub fn asset(&self, id: Uuid) -> Option<&Asset> {
        self.assets.get(id)
    }

    /// Attach decoded content for an asset (buffer-backed imports, tests).
    pub fn insert_source(&mut self, asset_id: Uuid, source: Box<dyn FrameSource>) {
        self.pool.insert(asset_id, source);
    }

    // ── Clip lifecycle ───────────────────────────────────────────

    /// Place an asset on a track. Selects the new clip and commits.
    pub fn add_clip(
        &mut self,
        asset_id: Uuid,
        track_id: Uuid,
        start_time: f64,
        duration: f64,
    ) -> Result<Uuid> {
        let track = self
            .track(track_id)
            .ok_or_else(|| MontageError::NotFound(format!("track {track_id}")))?;
        if track.locked {
            return Err(MontageError::Timeline("track is locked".into()));
        }
        if !(start_time >= 0.0 && duration > 0.0) {
            return Err(MontageError::InvalidParameter(
                "clip needs a non-negative start and positive duration".into(),
            ));
        }

        let mut duration = duration;
        if let Some(natural) = self
            .assets
            .get(asset_id)
            .filter(|a| a.kind == AssetKind::Video)
            .and_then(|a| a.natural_duration)
        {
            duration = duration.min(natural);
        }

        let clip = Clip::new(asset_id, track_id, start_time, duration);
        let id = clip.id;
        info!(clip = %id, asset = %asset_id, start_time, duration, "Added clip");
        self.clips.push(clip);
        self.selection = Some(id);
        self.commit();
        Ok(id)
    }

    /// Place a text clip on a track. Selects the new clip and commits.
    pub fn add_text_clip(
        &mut self,
        track_id: Uuid,
        start_time: f64,
        duration: f64,
        style: TextStyle,
    ) -> Result<Uuid> {
        let track = self
            .track(track_id)
            .ok_or_else(|| MontageError::NotFound(format!("track {track_id}")))?;
        if track.locked {
            return Err(MontageError::Timeline("track is locked".into()));
        }
        if !(start_time >= 0.0 && duration > 0.0) {
            return Err(MontageError::InvalidParameter(
                "clip needs a non-negative start and positive duration".into(),
            ));
        }
        let clip = Clip::new_text(track_id, start_time, duration, style);
        let id = clip.id;
        self.clips.push(clip);
        self.selection = Some(id);
        self.commit();
        Ok(id)
    }

    /// Select a clip (or clear the selection with `None`).
    pub fn select(&mut self, clip_id: Option<Uuid>) {
        self.selection = clip_id.filter(|id| self.clip(*id).is_some());
    }

    /// Delete the selected clip. No-op without a selection.
    pub fn delete_selected(&mut self) {
        let Some(id) = self.selection.take() else {
            return;
        };
        self.clips.retain(|c| c.id != id);
        debug!(clip = %id, "Deleted clip");
        self.commit();
    }

    /// Replace a clip's transform/appearance. Commits once.
    pub fn set_clip_properties(&mut self, clip_id: Uuid, properties: ClipProperties) -> bool {
        let Some(clip) = self.clip_mut(clip_id) else {
            return false;
        };
        clip.properties = properties.clamped();
        self.commit();
        true
    }

    /// Split the selected clip at the playhead.
    ///
    /// No-op unless the playhead is strictly inside the clip's active
    /// interval. The left half keeps the original id; the right half gets a
    /// fresh id, the remaining source window, and the selection.
    pub fn split_at_playhead(&mut self) {
        let instant = self.clock.position();
        let Some(selected) = self.selection else {
            return;
        };
        let Some(index) = self.clips.iter().position(|c| c.id == selected) else {
            return;
        };
        let clip = &self.clips[index];
        if !(instant > clip.start_time && instant < clip.end_time()) {
            return;
        }

        let cut = instant - clip.start_time;
        let mut right = clip.clone();
        right.id = Uuid::new_v4();
        right.start_time = instant;
        right.duration = clip.duration - cut;
        right.source_offset = clip.source_offset + cut;
        let right_id = right.id;

        self.clips[index].duration = cut;
        self.clips.insert(index + 1, right);
        self.selection = Some(right_id);
        info!(left = %selected, right = %right_id, at = instant, "Split clip");
        self.commit();
    }

    // ── Gestures ─────────────────────────────────────────────────

    /// Begin a drag gesture, capturing the clip's committed values.
    ///
    /// Returns false (and starts nothing) for unknown clips, locked tracks,
    /// or while an export is running.
    pub fn begin_drag(&mut self, clip_id: Uuid, mode: DragMode, pointer_x: f32) -> bool {
        if self.exporting {
            return false;
        }
        let Some(clip) = self.clip(clip_id) else {
            return false;
        };
        if self.track(clip.track_id).is_some_and(|t| t.locked) {
            return false;
        }
        self.drag = Some(DragSession::begin(clip, mode, pointer_x));
        self.selection = Some(clip_id);
        true
    }

    /// Apply a pointer-move to the in-flight gesture.
    ///
    /// Mutates only live state; history is untouched until `end_drag`.
    pub fn update_drag(&mut self, pointer_x: f32, pointer_y: f32) {
        let Some(drag) = self.drag.clone() else {
            return;
        };
        match drag.mode {
            DragMode::Move => {
                let candidate = drag.move_candidate(pointer_x, &self.view);
                let snapped = snap::resolve(
                    candidate,
                    drag.clip_id,
                    self.clock.position(),
                    &self.clips,
                    &self.view,
                );
                let retarget = self
                    .view
                    .lane_at(pointer_y, self.tracks.len())
                    .map(|lane| &self.tracks[lane])
                    .filter(|track| !track.locked)
                    .map(|track| track.id);
                if let Some(clip) = self.clip_mut(drag.clip_id) {
                    gesture::apply_move(clip, snapped);
                    if let Some(track_id) = retarget {
                        clip.track_id = track_id;
                    }
                }
            }
            DragMode::TrimStart => {
                let candidate = drag.trim_start_candidate(pointer_x, &self.view);
                let snapped = snap::resolve(
                    candidate,
                    drag.clip_id,
                    self.clock.position(),
                    &self.clips,
                    &self.view,
                );
                if let Some(clip) = self.clip_mut(drag.clip_id) {
                    gesture::apply_trim_start(clip, &drag, snapped);
                }
            }
            DragMode::TrimEnd => {
                let delta = drag.time_delta(pointer_x, &self.view);
                let natural_limit = self
                    .clip(drag.clip_id)
                    .and_then(Clip::asset_id)
                    .and_then(|id| self.assets.get(id))
                    .filter(|a| a.kind == AssetKind::Video)
                    .and_then(|a| a.natural_duration);
                if let Some(clip) = self.clip_mut(drag.clip_id) {
                    gesture::apply_trim_end(clip, &drag, delta, natural_limit);
                }
            }
        }
    }

    /// Finish the gesture, committing the result exactly once.
    pub fn end_drag(&mut self) {
        if let Some(drag) = self.drag.take() {
            debug!(clip = %drag.clip_id, mode = ?drag.mode, "Gesture committed");
            self.commit();
        }
    }

    /// Abandon the gesture, restoring the captured values without a commit.
    pub fn cancel_drag(&mut self) {
        if let Some(drag) = self.drag.take() {
            if let Some(clip) = self.clip_mut(drag.clip_id) {
                drag.restore(clip);
            }
        }
    }

    // ── History ──────────────────────────────────────────────────

    fn commit(&mut self) {
        self.history.commit(&self.clips, &self.tracks);
    }

    /// Step back one snapshot and apply it. Returns false at the boundary.
    pub fn undo(&mut self) -> bool {
        let Some(snapshot) = self.history.undo() else {
            return false;
        };
        let snapshot = snapshot.clone();
        self.clips = snapshot.clips;
        self.tracks = snapshot.tracks;
        self.prune_selection();
        true
    }

    /// Step forward one snapshot and apply it. Returns false at the boundary.
    pub fn redo(&mut self) -> bool {
        let Some(snapshot) = self.history.redo() else {
            return false;
        };
        let snapshot = snapshot.clone();
        self.clips = snapshot.clips;
        self.tracks = snapshot.tracks;
        self.prune_selection();
        true
    }

    fn prune_selection(&mut self) {
        if self
            .selection
            .is_some_and(|id| self.clip(id).is_none())
        {
            self.selection = None;
        }
    }

    // ── Playback ─────────────────────────────────────────────────

    /// Start preview playback. Refused while exporting.
    pub fn play(&mut self) {
        if !self.exporting {
            self.clock.play();
        }
    }

    /// Pause preview playback.
    pub fn pause(&mut self) {
        self.clock.pause();
    }

    /// Position the playhead directly, clamped to the project duration.
    pub fn scrub(&mut self, seconds: f64) {
        let duration = self.project_duration();
        self.clock.scrub(seconds, duration);
    }

    /// Advance the preview clock by the wall-clock delta since last tick.
    /// Suspended entirely while an export is running.
    pub fn tick(&mut self) {
        if self.exporting {
            return;
        }
        let duration = self.project_duration();
        self.clock.tick(duration);
    }

    /// Composite the frame under the playhead for interactive preview.
    pub fn render_preview(&mut self, compositor: &Compositor) -> RgbaImage {
        let mut provider = BoundPool {
            pool: &mut self.pool,
            registry: &self.assets,
        };
        compositor.render(
            &self.tracks,
            &self.clips,
            &self.assets,
            &mut provider,
            self.clock.position(),
            self.selection,
        )
    }

    // ── Export ───────────────────────────────────────────────────

    /// Enter the exporting state: clears the selection and pauses playback.
    pub fn begin_export(&mut self) -> Result<()> {
        if self.exporting {
            return Err(MontageError::Timeline("export already running".into()));
        }
        self.exporting = true;
        self.selection = None;
        self.clock.pause();
        Ok(())
    }

    /// Leave the exporting state.
    pub fn end_export(&mut self) {
        self.exporting = false;
    }

    /// Run a full export through the given sink.
    pub fn export(
        &mut self,
        compositor: &Compositor,
        sink: &mut dyn FrameSink,
        wait: &SeekWait,
        cancel: &ExportCancel,
        on_progress: impl FnMut(u8),
    ) -> Result<ExportOutcome> {
        self.begin_export()?;
        let duration = self.project_duration();
        let result = export::run(
            &self.tracks,
            &self.clips,
            &self.assets,
            &mut self.pool,
            compositor,
            sink,
            duration,
            wait,
            cancel,
            on_progress,
        );
        self.end_export();
        result
    }
}

impl Default for EditorSession {
    fn default() -> Self {
        Self::new()
    }
}
