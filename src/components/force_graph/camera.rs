//! Viewport mapping: autoscaled bounding box, camera state and camera animation.
//!
//! Graph coordinates are first normalized against a bounding box (the graph's
//! own, unless a custom one is pinned) so the whole graph fits the viewport at
//! `ratio == 1`. The camera then pans and zooms in that normalized space.

use super::state::ease_out_cubic;

const MIN_RATIO: f64 = 0.05;
const MAX_RATIO: f64 = 20.0;
/// Share of the shorter viewport side the normalized graph occupies.
const FIT: f64 = 0.9;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BBox {
	pub min_x: f64,
	pub min_y: f64,
	pub max_x: f64,
	pub max_y: f64,
}

impl BBox {
	pub fn around(points: impl IntoIterator<Item = (f64, f64)>) -> Option<Self> {
		points.into_iter().fold(None, |acc, (x, y)| {
			Some(match acc {
				None => BBox {
					min_x: x,
					min_y: y,
					max_x: x,
					max_y: y,
				},
				Some(b) => BBox {
					min_x: b.min_x.min(x),
					min_y: b.min_y.min(y),
					max_x: b.max_x.max(x),
					max_y: b.max_y.max(y),
				},
			})
		})
	}

	fn center(&self) -> (f64, f64) {
		((self.min_x + self.max_x) / 2.0, (self.min_y + self.max_y) / 2.0)
	}

	fn extent(&self) -> f64 {
		(self.max_x - self.min_x).max(self.max_y - self.min_y).max(1e-9)
	}
}

/// Camera position in normalized space; `(0, 0, 1)` shows the whole graph.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraState {
	pub x: f64,
	pub y: f64,
	pub ratio: f64,
}

impl Default for CameraState {
	fn default() -> Self {
		Self {
			x: 0.0,
			y: 0.0,
			ratio: 1.0,
		}
	}
}

#[derive(Clone, Debug)]
struct CameraAnimation {
	from: CameraState,
	to: CameraState,
	elapsed: f64,
	duration: f64,
}

#[derive(Clone, Debug, Default)]
pub struct PanState {
	pub active: bool,
	pub start_x: f64,
	pub start_y: f64,
	pub camera_start: CameraState,
}

/// Resolved mapping for one frame.
#[derive(Clone, Copy, Debug)]
pub struct Frame {
	center: (f64, f64),
	extent: f64,
	camera: CameraState,
	width: f64,
	height: f64,
}

impl Frame {
	fn scale(&self) -> f64 {
		self.width.min(self.height) * FIT / self.camera.ratio
	}

	pub fn graph_to_normalized(&self, x: f64, y: f64) -> (f64, f64) {
		((x - self.center.0) / self.extent, (y - self.center.1) / self.extent)
	}

	pub fn graph_to_viewport(&self, x: f64, y: f64) -> (f64, f64) {
		let (nx, ny) = self.graph_to_normalized(x, y);
		(
			self.width / 2.0 + (nx - self.camera.x) * self.scale(),
			self.height / 2.0 + (ny - self.camera.y) * self.scale(),
		)
	}

	pub fn viewport_to_graph(&self, sx: f64, sy: f64) -> (f64, f64) {
		let nx = self.camera.x + (sx - self.width / 2.0) / self.scale();
		let ny = self.camera.y + (sy - self.height / 2.0) / self.scale();
		(nx * self.extent + self.center.0, ny * self.extent + self.center.1)
	}

	/// On-screen radius of a node of `size`; grows with the square root of the zoom.
	pub fn node_radius(&self, size: f64) -> f64 {
		size / self.camera.ratio.sqrt()
	}
}

#[derive(Clone, Debug)]
pub struct Camera {
	pub state: CameraState,
	pub pan: PanState,
	custom_bbox: Option<BBox>,
	animation: Option<CameraAnimation>,
}

impl Default for Camera {
	fn default() -> Self {
		Self::new()
	}
}

impl Camera {
	pub fn new() -> Self {
		Self {
			state: CameraState::default(),
			pan: PanState::default(),
			custom_bbox: None,
			animation: None,
		}
	}

	/// Mapping for a viewport of `width` x `height` given the graph's own bbox.
	pub fn frame(&self, graph_bbox: Option<BBox>, width: f64, height: f64) -> Frame {
		let bbox = self.custom_bbox.or(graph_bbox).unwrap_or(BBox {
			min_x: -0.5,
			min_y: -0.5,
			max_x: 0.5,
			max_y: 0.5,
		});
		Frame {
			center: bbox.center(),
			extent: bbox.extent(),
			camera: self.state,
			width,
			height,
		}
	}

	pub fn custom_bbox(&self) -> Option<BBox> {
		self.custom_bbox
	}

	/// Pin the normalization box; `None` resumes autoscaling.
	pub fn set_custom_bbox(&mut self, bbox: Option<BBox>) {
		self.custom_bbox = bbox;
	}

	/// Start an animated move; replaces any running animation.
	pub fn animate(&mut self, to: CameraState, duration: f64) {
		if duration <= 0.0 {
			self.state = to;
			self.animation = None;
			return;
		}
		self.animation = Some(CameraAnimation {
			from: self.state,
			to,
			elapsed: 0.0,
			duration,
		});
	}

	pub fn is_animating(&self) -> bool {
		self.animation.is_some()
	}

	pub fn tick(&mut self, dt: f64) {
		let Some(anim) = self.animation.as_mut() else {
			return;
		};
		anim.elapsed += dt;
		let t = ease_out_cubic((anim.elapsed / anim.duration).min(1.0));
		let lerp = |a: f64, b: f64| a + (b - a) * t;
		self.state = CameraState {
			x: lerp(anim.from.x, anim.to.x),
			y: lerp(anim.from.y, anim.to.y),
			ratio: lerp(anim.from.ratio, anim.to.ratio),
		};
		if anim.elapsed >= anim.duration {
			self.state = anim.to;
			self.animation = None;
		}
	}

	/// Zoom by `factor` keeping the point under (`sx`, `sy`) fixed.
	pub fn zoom_at(&mut self, frame: &Frame, sx: f64, sy: f64, factor: f64) {
		self.animation = None;
		let scale = frame.scale();
		let anchor_x = self.state.x + (sx - frame.width / 2.0) / scale;
		let anchor_y = self.state.y + (sy - frame.height / 2.0) / scale;
		let ratio = (self.state.ratio * factor).clamp(MIN_RATIO, MAX_RATIO);
		let new_scale = scale * self.state.ratio / ratio;
		self.state = CameraState {
			x: anchor_x - (sx - frame.width / 2.0) / new_scale,
			y: anchor_y - (sy - frame.height / 2.0) / new_scale,
			ratio,
		};
	}

	pub fn begin_pan(&mut self, sx: f64, sy: f64) {
		self.animation = None;
		self.pan = PanState {
			active: true,
			start_x: sx,
			start_y: sy,
			camera_start: self.state,
		};
	}

	pub fn pan_to(&mut self, frame: &Frame, sx: f64, sy: f64) {
		if !self.pan.active {
			return;
		}
		let scale = frame.width.min(frame.height) * FIT / self.pan.camera_start.ratio;
		self.state.x = self.pan.camera_start.x - (sx - self.pan.start_x) / scale;
		self.state.y = self.pan.camera_start.y - (sy - self.pan.start_y) / scale;
	}

	pub fn end_pan(&mut self) {
		self.pan.active = false;
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn bbox() -> Option<BBox> {
		Some(BBox {
			min_x: -100.0,
			min_y: -50.0,
			max_x: 100.0,
			max_y: 50.0,
		})
	}

	fn close(a: (f64, f64), b: (f64, f64)) -> bool {
		(a.0 - b.0).abs() < 1e-9 && (a.1 - b.1).abs() < 1e-9
	}

	#[test]
	fn default_camera_fits_graph_in_view() {
		let camera = Camera::new();
		let frame = camera.frame(bbox(), 800.0, 600.0);
		assert!(close(frame.graph_to_viewport(0.0, 0.0), (400.0, 300.0)));
		let (left, _) = frame.graph_to_viewport(-100.0, 0.0);
		let (right, _) = frame.graph_to_viewport(100.0, 0.0);
		assert!(left >= 0.0 && right <= 800.0);
	}

	#[test]
	fn viewport_and_graph_coordinates_invert() {
		let mut camera = Camera::new();
		camera.state = CameraState {
			x: 0.1,
			y: -0.2,
			ratio: 0.5,
		};
		let frame = camera.frame(bbox(), 640.0, 480.0);
		let (sx, sy) = frame.graph_to_viewport(37.0, -12.0);
		assert!(close(frame.viewport_to_graph(sx, sy), (37.0, -12.0)));
	}

	#[test]
	fn zoom_keeps_point_under_cursor() {
		let mut camera = Camera::new();
		let before = camera.frame(bbox(), 800.0, 600.0);
		let anchor = before.viewport_to_graph(600.0, 150.0);
		camera.zoom_at(&before, 600.0, 150.0, 0.5);
		let after = camera.frame(bbox(), 800.0, 600.0);
		assert!(close(after.viewport_to_graph(600.0, 150.0), anchor));
		assert_eq!(camera.state.ratio, 0.5);
	}

	#[test]
	fn pinned_bbox_overrides_autoscale() {
		let mut camera = Camera::new();
		camera.set_custom_bbox(bbox());
		let grown = Some(BBox {
			min_x: -1000.0,
			min_y: -1000.0,
			max_x: 1000.0,
			max_y: 1000.0,
		});
		let pinned = camera.frame(grown, 800.0, 600.0);
		let auto = Camera::new().frame(bbox(), 800.0, 600.0);
		assert!(close(pinned.graph_to_viewport(50.0, 10.0), auto.graph_to_viewport(50.0, 10.0)));
	}

	#[test]
	fn animation_reaches_target() {
		let mut camera = Camera::new();
		camera.state.ratio = 3.0;
		let target = CameraState::default();
		camera.animate(target, 1.0);
		camera.tick(0.5);
		assert!(camera.is_animating());
		assert!(camera.state.ratio < 3.0 && camera.state.ratio > 1.0);
		camera.tick(0.6);
		assert!(!camera.is_animating());
		assert_eq!(camera.state, target);
	}

	#[test]
	fn pan_moves_opposite_to_drag() {
		let mut camera = Camera::new();
		let frame = camera.frame(bbox(), 800.0, 600.0);
		let grabbed = frame.viewport_to_graph(100.0, 100.0);
		camera.begin_pan(100.0, 100.0);
		camera.pan_to(&frame, 150.0, 80.0);
		camera.end_pan();
		let after = camera.frame(bbox(), 800.0, 600.0);
		assert!(close(after.viewport_to_graph(150.0, 80.0), grabbed));
	}
}
