//! Field-of-view wedges, rotation handles and connection arrows.
//!
//! Everything works in floor-plan image space: x grows right, y grows
//! down. Device rotation is a heading where 0 points up (negative y) and
//! angles grow clockwise. Screen angles (`atan2(dy, dx)`) are measured
//! from +x, so `rotation = screen_angle + 90`.

use serde::{Deserialize, Serialize};

use crate::model::{Device, EntityId, Project};

// ── Constants ───────────────────────────────────────────────────────

/// Distance from device centre to its rotation handle.
pub const ROTATION_HANDLE_OFFSET: f64 = 45.0;
pub const FOV_WEDGE_RADIUS: f64 = 120.0;
pub const BROADCAST_RADIUS: f64 = 150.0;
pub const SELECTION_RING_RADIUS: f64 = 30.0;
pub const ARROW_HEAD_LENGTH: f64 = 10.0;
pub const ARROW_HEAD_WIDTH: f64 = 10.0;
/// Pointer distance within which a device counts as hit.
pub const HIT_RADIUS: f64 = 20.0;
pub const MIN_FOV: f64 = 15.0;
pub const MAX_FOV: f64 = 180.0;

// ── Point ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    #[must_use]
    pub fn offset(self, dx: f64, dy: f64) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }

    pub fn distance_to(self, other: Self) -> f64 {
        (other.x - self.x).hypot(other.y - self.y)
    }
}

// ── Angles ──────────────────────────────────────────────────────────

/// Wrap any heading into [0, 360).
pub fn normalize_rotation(degrees: f64) -> f64 {
    if degrees.is_finite() {
        let wrapped = degrees.rem_euclid(360.0);
        // rem_euclid can round up to exactly 360 for tiny negatives
        if wrapped >= 360.0 { 0.0 } else { wrapped }
    } else {
        0.0
    }
}

/// Clamp a field of view into [`MIN_FOV`], [`MAX_FOV`].
pub fn clamp_fov(degrees: f64) -> f64 {
    if degrees.is_nan() {
        crate::model::DEFAULT_FOV
    } else {
        degrees.clamp(MIN_FOV, MAX_FOV)
    }
}

/// Heading that points from `center` towards `pointer`.
///
/// Returns `atan2(dy, dx) + 90` unwrapped, i.e. in (-90, 270]. Committing
/// code decides whether to normalize.
pub fn compute_rotation(center: Point, pointer: Point) -> f64 {
    let angle = (pointer.y - center.y).atan2(pointer.x - center.x).to_degrees();
    angle + 90.0
}

/// Unit vector for a heading.
pub fn heading_vector(rotation: f64) -> Point {
    let r = rotation.to_radians();
    Point::new(r.sin(), -r.cos())
}

/// Rotation handle offset relative to the device centre.
pub fn handle_offset(rotation: f64, offset: f64) -> Point {
    let dir = heading_vector(rotation);
    Point::new(offset * dir.x, offset * dir.y)
}

/// Rotation handle in absolute image coordinates.
pub fn handle_position(center: Point, rotation: f64, offset: f64) -> Point {
    let rel = handle_offset(rotation, offset);
    center.offset(rel.x, rel.y)
}

// ── Field-of-view wedge ─────────────────────────────────────────────

/// Circular sector spanning `fov` degrees, bisected by `rotation`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FovWedge {
    pub center: Point,
    pub rotation: f64,
    pub fov: f64,
    pub radius: f64,
}

impl FovWedge {
    pub fn for_device(device: &Device) -> Option<Self> {
        device.category.has_field_of_view().then(|| Self {
            center: device.position(),
            rotation: device.rotation,
            fov: device.fov,
            radius: FOV_WEDGE_RADIUS,
        })
    }

    /// Heading of the first edge.
    pub fn start_rotation(&self) -> f64 {
        self.rotation - self.fov / 2.0
    }

    pub fn end_rotation(&self) -> f64 {
        self.rotation + self.fov / 2.0
    }

    pub fn bisector(&self) -> Point {
        heading_vector(self.rotation)
    }

    /// Start angle measured from +x, clockwise, for canvas APIs that draw
    /// arcs in screen angles.
    pub fn screen_start_angle(&self) -> f64 {
        self.start_rotation() - 90.0
    }

    /// Closed polygon: centre, then `segments + 1` points along the arc.
    #[allow(clippy::cast_precision_loss, clippy::as_conversions)]
    pub fn outline(&self, segments: usize) -> Vec<Point> {
        let segments = segments.max(1);
        let start = self.start_rotation();
        let mut points = Vec::with_capacity(segments + 2);
        points.push(self.center);
        for step in 0..=segments {
            let t = step as f64 / segments as f64;
            let dir = heading_vector(start + self.fov * t);
            points.push(self.center.offset(dir.x * self.radius, dir.y * self.radius));
        }
        points
    }
}

// ── Connections ─────────────────────────────────────────────────────

/// Resolved endpoints of a connection, ready to draw.
#[derive(Debug, Clone, PartialEq)]
pub struct ConnectionSegment {
    pub id: EntityId,
    pub from: Point,
    pub to: Point,
}

/// Segments for every connection whose endpoints both resolve.
/// Dangling connections are skipped.
pub fn connection_segments(project: &Project) -> Vec<ConnectionSegment> {
    project
        .connections
        .iter()
        .filter_map(|c| {
            let from = project.device(&c.from_id)?;
            let to = project.device(&c.to_id)?;
            Some(ConnectionSegment {
                id: c.id.clone(),
                from: from.position(),
                to: to.position(),
            })
        })
        .collect()
}

/// Arrow head triangle `[tip, left, right]` with the tip on `to`.
/// `None` for zero-length segments.
pub fn arrow_head(from: Point, to: Point) -> Option<[Point; 3]> {
    let length = from.distance_to(to);
    if length <= f64::EPSILON {
        return None;
    }
    let ux = (to.x - from.x) / length;
    let uy = (to.y - from.y) / length;
    let base = to.offset(-ux * ARROW_HEAD_LENGTH, -uy * ARROW_HEAD_LENGTH);
    let half = ARROW_HEAD_WIDTH / 2.0;
    Some([
        to,
        base.offset(-uy * half, ux * half),
        base.offset(uy * half, -ux * half),
    ])
}

/// Topmost device within `radius` of `point`. Later devices draw on top.
pub fn hit_test(devices: &[Device], point: Point, radius: f64) -> Option<&Device> {
    devices
        .iter()
        .rev()
        .find(|d| d.position().distance_to(point) <= radius)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use crate::model::{Connection, DeviceCategory, IdGenerator};

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn zero_rotation_points_up() {
        let wedge = FovWedge {
            center: Point::default(),
            rotation: 0.0,
            fov: 90.0,
            radius: FOV_WEDGE_RADIUS,
        };
        let b = wedge.bisector();
        assert!(approx(b.x, 0.0));
        assert!(approx(b.y, -1.0));
        assert_eq!(wedge.start_rotation(), -45.0);
        assert_eq!(wedge.screen_start_angle(), -135.0);
    }

    #[test]
    fn pointer_below_faces_down() {
        let r = compute_rotation(Point::new(100.0, 100.0), Point::new(100.0, 200.0));
        assert!(approx(r, 180.0));
    }

    #[test]
    fn pointer_above_faces_up_and_right_faces_east() {
        let c = Point::new(0.0, 0.0);
        assert!(approx(compute_rotation(c, Point::new(0.0, -10.0)), 0.0));
        assert!(approx(compute_rotation(c, Point::new(10.0, 0.0)), 90.0));
        assert!(approx(normalize_rotation(compute_rotation(c, Point::new(-10.0, -10.0))), 315.0));
    }

    #[test]
    fn handle_sits_on_heading() {
        let h = handle_offset(90.0, ROTATION_HANDLE_OFFSET);
        assert!(approx(h.x, 45.0));
        assert!(approx(h.y, 0.0));
        let h = handle_position(Point::new(10.0, 10.0), 0.0, ROTATION_HANDLE_OFFSET);
        assert!(approx(h.x, 10.0));
        assert!(approx(h.y, -35.0));
    }

    #[test]
    fn handle_round_trips_through_compute_rotation() {
        let center = Point::new(300.0, 200.0);
        for rotation in [0.0, 30.0, 135.0, 200.0, 359.0] {
            let handle = handle_position(center, rotation, ROTATION_HANDLE_OFFSET);
            let back = normalize_rotation(compute_rotation(center, handle));
            assert!(approx(back, rotation), "{rotation} -> {back}");
        }
    }

    #[test]
    fn normalize_and_clamp() {
        assert_eq!(normalize_rotation(-90.0), 270.0);
        assert_eq!(normalize_rotation(720.0), 0.0);
        assert_eq!(normalize_rotation(f64::NAN), 0.0);
        assert_eq!(clamp_fov(5.0), 15.0);
        assert_eq!(clamp_fov(200.0), 180.0);
        assert_eq!(clamp_fov(60.0), 60.0);
    }

    #[test]
    fn outline_spans_the_wedge() {
        let wedge = FovWedge {
            center: Point::new(0.0, 0.0),
            rotation: 90.0,
            fov: 90.0,
            radius: 100.0,
        };
        let pts = wedge.outline(4);
        assert_eq!(pts.len(), 6);
        assert_eq!(pts[0], Point::new(0.0, 0.0));
        let first = pts[1];
        let last = pts[5];
        // start heading 45 (up-right), end heading 135 (down-right)
        assert!(approx(first.x, 100.0 * 45f64.to_radians().sin()));
        assert!(first.y < 0.0);
        assert!(last.y > 0.0);
    }

    #[test]
    fn wedge_only_for_cameras() {
        let ids = IdGenerator::new();
        let mut d = Project::default().create_device(&ids, Point::default());
        assert!(FovWedge::for_device(&d).is_some());
        d.category = DeviceCategory::Router;
        assert!(FovWedge::for_device(&d).is_none());
    }

    #[test]
    fn dangling_connections_are_skipped() {
        let ids = IdGenerator::new();
        let p = Project::default();
        let a = p.create_device(&ids, Point::new(0.0, 0.0));
        let p = p.add_device(a.clone());
        let b = p.create_device(&ids, Point::new(30.0, 40.0));
        let p = p.add_device(b.clone());
        let good = p.create_connection(&ids, a.id.clone(), b.id.clone()).unwrap();
        let bad = Connection::create(EntityId::new("conn_bad"), a.id.clone(), EntityId::new("cam_missing")).unwrap();
        let p = p.add_connection(good.clone()).add_connection(bad);

        let segments = connection_segments(&p);
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].id, good.id);
        assert_eq!(segments[0].to, Point::new(30.0, 40.0));
    }

    #[test]
    fn arrow_tip_lands_on_target() {
        let [tip, left, right] = arrow_head(Point::new(0.0, 0.0), Point::new(100.0, 0.0)).unwrap();
        assert_eq!(tip, Point::new(100.0, 0.0));
        assert!(approx(left.x, 90.0) && approx(right.x, 90.0));
        assert!(approx((left.y - right.y).abs(), ARROW_HEAD_WIDTH));
        assert!(arrow_head(Point::new(5.0, 5.0), Point::new(5.0, 5.0)).is_none());
    }

    #[test]
    fn hit_test_prefers_topmost() {
        let ids = IdGenerator::new();
        let p = Project::default();
        let a = p.create_device(&ids, Point::new(10.0, 10.0));
        let p = p.add_device(a);
        let b = p.create_device(&ids, Point::new(15.0, 10.0));
        let p = p.add_device(b.clone());
        let hit = hit_test(&p.devices, Point::new(12.0, 10.0), HIT_RADIUS).unwrap();
        assert_eq!(hit.id, b.id);
        assert!(hit_test(&p.devices, Point::new(500.0, 500.0), HIT_RADIUS).is_none());
    }
}
