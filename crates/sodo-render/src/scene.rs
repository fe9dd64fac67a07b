// ── SVG scene construction ──
//
// Layer order, bottom to top: background, floor plan, coverage circles,
// field-of-view wedges, connections, device markers, labels, selection.

use std::fmt::Write as _;

use sodo_core::geometry::{
    self, BROADCAST_RADIUS, FovWedge, SELECTION_RING_RADIUS,
};
use sodo_core::{DeviceStatus, EntityId, FloorPlan, LinkMedium, Project};

pub const MIN_CANVAS_WIDTH: f64 = 800.0;
pub const MIN_CANVAS_HEIGHT: f64 = 600.0;
const EXTENT_MARGIN: f64 = BROADCAST_RADIUS + 20.0;
const MARKER_RADIUS: f64 = 12.0;
const WEDGE_SEGMENTS: usize = 32;

// ── Palette ─────────────────────────────────────────────────────────

const ACTIVE: &str = "#3b82f6";
const MAINTENANCE: &str = "#f59e0b";
const LINK: &str = "#64748b";
const SELECTION: &str = "#10b981";
const LABEL: &str = "#0f172a";
const BACKGROUND: &str = "#ffffff";

pub fn status_color(status: DeviceStatus) -> &'static str {
    match status {
        DeviceStatus::Active => ACTIVE,
        DeviceStatus::Maintenance => MAINTENANCE,
    }
}

// ── Options ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct SceneOptions {
    /// Device to ring as selected.
    pub selected: Option<EntityId>,
    pub show_labels: bool,
    pub show_coverage: bool,
}

impl Default for SceneOptions {
    fn default() -> Self {
        Self {
            selected: None,
            show_labels: true,
            show_coverage: true,
        }
    }
}

/// Visible canvas region in image pixels. The origin is negative when
/// devices sit left of or above the floor plan.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CanvasSize {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl CanvasSize {
    pub const fn new(width: f64, height: f64) -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            width,
            height,
        }
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }
}

impl Default for CanvasSize {
    fn default() -> Self {
        Self::new(MIN_CANVAS_WIDTH, MIN_CANVAS_HEIGHT)
    }
}

/// Floor-plan dimensions when the image has a measured size, otherwise
/// the device extents plus a margin, never below 800×600.
pub fn canvas_size(project: &Project) -> CanvasSize {
    if let Some((width, height)) = plan_dimensions(project) {
        return CanvasSize::new(f64::from(width), f64::from(height));
    }
    let (min_x, min_y, max_x, max_y) = project.devices.iter().fold(
        (0.0_f64, 0.0_f64, 0.0_f64, 0.0_f64),
        |(lx, ly, hx, hy), d| (lx.min(d.x), ly.min(d.y), hx.max(d.x), hy.max(d.y)),
    );
    let x = if min_x < 0.0 { min_x - EXTENT_MARGIN } else { 0.0 };
    let y = if min_y < 0.0 { min_y - EXTENT_MARGIN } else { 0.0 };
    CanvasSize {
        x,
        y,
        width: (max_x + EXTENT_MARGIN - x).max(MIN_CANVAS_WIDTH),
        height: (max_y + EXTENT_MARGIN - y).max(MIN_CANVAS_HEIGHT),
    }
}

fn plan_dimensions(project: &Project) -> Option<(u32, u32)> {
    project
        .floor_plan
        .as_deref()
        .and_then(|url| FloorPlan::from_data_url(url).ok())
        .and_then(|plan| plan.dimensions)
}

// ── Scene ───────────────────────────────────────────────────────────

/// Full SVG document for the project.
pub fn scene_svg(project: &Project, options: &SceneOptions) -> String {
    let size = canvas_size(project);
    let mut svg = String::with_capacity(4096);
    let _ = write!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" xmlns:xlink="http://www.w3.org/1999/xlink" width="{w}" height="{h}" viewBox="{x} {y} {w} {h}">"#,
        x = num(size.x),
        y = num(size.y),
        w = num(size.width),
        h = num(size.height),
    );
    let _ = write!(
        svg,
        r#"<rect x="{}" y="{}" width="{}" height="{}" fill="{BACKGROUND}"/>"#,
        num(size.x),
        num(size.y),
        num(size.width),
        num(size.height)
    );

    if let Some(url) = project.floor_plan.as_deref() {
        // Unmeasured plans stretch over the positive quadrant.
        let _ = write!(
            svg,
            r#"<image x="0" y="0" width="{}" height="{}" xlink:href="{}"/>"#,
            num(size.right()),
            num(size.bottom()),
            escape(url)
        );
    }

    if options.show_coverage {
        for d in project.devices.iter().filter(|d| d.category.has_broadcast_radius()) {
            let color = status_color(d.status);
            let _ = write!(
                svg,
                r#"<circle cx="{}" cy="{}" r="{}" fill="{color}" fill-opacity="0.08" stroke="{color}" stroke-opacity="0.35" stroke-dasharray="6 4"/>"#,
                num(d.x),
                num(d.y),
                num(BROADCAST_RADIUS)
            );
        }
    }

    for (d, wedge) in project
        .devices
        .iter()
        .filter_map(|d| FovWedge::for_device(d).map(|w| (d, w)))
    {
        let color = status_color(d.status);
        let _ = write!(
            svg,
            r#"<polygon points="{}" fill="{color}" fill-opacity="0.2" stroke="{color}" stroke-opacity="0.5"/>"#,
            points(&wedge.outline(WEDGE_SEGMENTS))
        );
    }

    for segment in geometry::connection_segments(project) {
        let medium = project
            .connection(&segment.id)
            .map_or(LinkMedium::Wired, |c| c.medium);
        let dash = match medium {
            LinkMedium::Wired => "",
            LinkMedium::Wireless => r#" stroke-dasharray="8 6""#,
        };
        let _ = write!(
            svg,
            r#"<line x1="{}" y1="{}" x2="{}" y2="{}" stroke="{LINK}" stroke-width="2"{dash}/>"#,
            num(segment.from.x),
            num(segment.from.y),
            num(segment.to.x),
            num(segment.to.y)
        );
        if let Some(head) = geometry::arrow_head(segment.from, segment.to) {
            let _ = write!(svg, r#"<polygon points="{}" fill="{LINK}"/>"#, points(&head));
        }
    }

    for d in &project.devices {
        let _ = write!(
            svg,
            r##"<circle cx="{}" cy="{}" r="{}" fill="{}" stroke="#ffffff" stroke-width="2"/>"##,
            num(d.x),
            num(d.y),
            num(MARKER_RADIUS),
            status_color(d.status)
        );
        if options.show_labels {
            let _ = write!(
                svg,
                r#"<text x="{}" y="{}" font-size="12" font-family="sans-serif" text-anchor="middle" fill="{LABEL}">{}</text>"#,
                num(d.x),
                num(d.y + MARKER_RADIUS + 14.0),
                escape(&d.name)
            );
        }
    }

    if let Some(d) = options.selected.as_ref().and_then(|id| project.device(id)) {
        let _ = write!(
            svg,
            r#"<circle cx="{}" cy="{}" r="{}" fill="none" stroke="{SELECTION}" stroke-width="2" stroke-dasharray="4 3"/>"#,
            num(d.x),
            num(d.y),
            num(SELECTION_RING_RADIUS)
        );
    }

    svg.push_str("</svg>");
    svg
}

fn num(v: f64) -> String {
    let rounded = (v * 100.0).round() / 100.0;
    format!("{rounded}")
}

fn points(pts: &[geometry::Point]) -> String {
    pts.iter()
        .map(|p| format!("{},{}", num(p.x), num(p.y)))
        .collect::<Vec<_>>()
        .join(" ")
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use pretty_assertions::assert_eq;
    use sodo_core::{Connection, DeviceCategory, IdGenerator, Point};

    use super::*;

    fn project() -> Project {
        let ids = IdGenerator::new();
        let p = Project::default();
        let mut cam = p.create_device(&ids, Point::new(100.0, 100.0));
        cam.name = "Cổng <A>".into();
        let p = p.add_device(cam.clone());
        let mut router = p.create_device(&ids, Point::new(300.0, 200.0));
        router.category = DeviceCategory::Router;
        router.status = DeviceStatus::Maintenance;
        let p = p.add_device(router.clone());
        let link = p.create_connection(&ids, cam.id, router.id).unwrap();
        p.add_connection(link)
    }

    #[test]
    fn empty_project_uses_minimum_canvas() {
        let size = canvas_size(&Project::default());
        assert_eq!(size, CanvasSize::new(800.0, 600.0));
    }

    #[test]
    fn devices_at_negative_coordinates_shift_the_origin() {
        let ids = IdGenerator::new();
        let p = Project::default();
        let d = p.create_device(&ids, Point::new(-200.0, -50.0));
        let p = p.add_device(d);
        let size = canvas_size(&p);
        assert_eq!(size.x, -200.0 - EXTENT_MARGIN);
        assert_eq!(size.y, -50.0 - EXTENT_MARGIN);
        assert!(size.right() >= EXTENT_MARGIN);
        assert_eq!(size.width, 800.0);

        let svg = scene_svg(&p, &SceneOptions::default());
        assert!(svg.contains(r#"viewBox="-370 -220 800 600""#));
        assert!(svg.contains(r#"<rect x="-370" y="-220""#));
    }

    #[test]
    fn unmeasured_plan_falls_back_to_device_extents() {
        let svg_plan = br#"<svg xmlns="http://www.w3.org/2000/svg" width="40" height="30"/>"#;
        let url = sodo_core::floorplan::to_data_url("image/svg+xml", svg_plan);
        let ids = IdGenerator::new();
        let p = Project::default().with_floor_plan(Some(url));
        let d = p.create_device(&ids, Point::new(1000.0, 100.0));
        let p = p.add_device(d);

        let size = canvas_size(&p);
        assert_eq!(size, CanvasSize::new(1000.0 + EXTENT_MARGIN, 600.0));
        let svg = scene_svg(&p, &SceneOptions::default());
        assert!(svg.contains(r#"<image x="0" y="0" width="1170" height="600""#));
    }

    #[test]
    fn far_devices_grow_the_canvas() {
        let ids = IdGenerator::new();
        let p = Project::default();
        let d = p.create_device(&ids, Point::new(1000.0, 900.0));
        let size = canvas_size(&p.add_device(d));
        assert_eq!(size.width, 1000.0 + EXTENT_MARGIN);
        assert_eq!(size.height, 900.0 + EXTENT_MARGIN);
    }

    #[test]
    fn scene_contains_every_layer() {
        let p = project();
        let svg = scene_svg(&p, &SceneOptions::default());
        assert!(svg.starts_with("<svg"));
        assert!(svg.ends_with("</svg>"));
        // router coverage circle
        assert!(svg.contains(r#"r="150""#));
        // camera wedge
        assert!(svg.contains("<polygon points=\"100,100 "));
        assert!(svg.contains("<line "));
        assert!(svg.contains(MAINTENANCE));
        assert!(svg.contains("Cổng &lt;A&gt;"));
        assert!(!svg.contains(SELECTION));
    }

    #[test]
    fn selection_ring_and_dangling_links() {
        let mut p = project();
        let selected = p.devices[0].id.clone();
        p.connections.push(
            Connection::create(EntityId::new("conn_x"), selected.clone(), EntityId::new("cam_gone")).unwrap(),
        );
        let svg = scene_svg(
            &p,
            &SceneOptions {
                selected: Some(selected),
                show_labels: false,
                show_coverage: false,
            },
        );
        assert_eq!(svg.matches("<line ").count(), 1);
        assert!(svg.contains(SELECTION));
        assert!(!svg.contains("<text"));
        assert!(!svg.contains(r#"r="150""#));
    }

    #[test]
    fn numbers_are_compact() {
        assert_eq!(num(100.0), "100");
        assert_eq!(num(12.345_6), "12.35");
    }
}
