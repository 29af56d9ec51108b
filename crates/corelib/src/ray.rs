//! Screen-space picking: cursor ray generation, Möller-Trumbore triangle
//! intersection and world-to-screen projection for label overlays.
//! All cursor/screen coordinates are physical pixels with the origin at the
//! top-left corner.

use crate::camera::Camera;
use crate::{Vec2, Vec3};

const EPSILON: f32 = 1e-7;

/// A ray in world space. `dir` is normalized.
#[derive(Clone, Copy, Debug)]
pub struct Ray {
    pub origin: Vec3,
    pub dir: Vec3,
}

impl Ray {
    #[inline]
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.dir * t
    }
}

/// Ray from the camera through a cursor position.
/// Returns `None` for a degenerate viewport or a non-invertible projection.
pub fn screen_ray(camera: &Camera, cursor: Vec2, viewport: Vec2) -> Option<Ray> {
    if viewport.x <= 0.0 || viewport.y <= 0.0 {
        return None;
    }
    let ndc = Vec2::new(
        cursor.x / viewport.x * 2.0 - 1.0,
        1.0 - cursor.y / viewport.y * 2.0,
    );

    let inv = camera.proj_view().inverse();
    let near = inv.project_point3(Vec3::new(ndc.x, ndc.y, 0.0));
    let far = inv.project_point3(Vec3::new(ndc.x, ndc.y, 1.0));
    if !near.is_finite() || !far.is_finite() {
        return None;
    }

    let dir = (far - near).normalize_or(Vec3::ZERO);
    if dir == Vec3::ZERO {
        return None;
    }
    Some(Ray { origin: near, dir })
}

/// Project a world point to screen pixels.
/// Returns `None` for points at or behind the camera plane (clip w <= 0).
pub fn project(camera: &Camera, world: Vec3, viewport: Vec2) -> Option<Vec2> {
    let clip = camera.proj_view() * world.extend(1.0);
    if clip.w <= EPSILON {
        return None;
    }
    let ndc = clip.truncate() / clip.w;
    Some(Vec2::new(
        (ndc.x + 1.0) * 0.5 * viewport.x,
        (1.0 - ndc.y) * 0.5 * viewport.y,
    ))
}

/// Möller-Trumbore ray/triangle intersection.
/// Returns the distance along the ray for hits in front of the origin.
/// Both triangle windings are accepted.
pub fn intersect_triangle(ray: &Ray, v0: Vec3, v1: Vec3, v2: Vec3) -> Option<f32> {
    let edge1 = v1 - v0;
    let edge2 = v2 - v0;
    let h = ray.dir.cross(edge2);
    let a = edge1.dot(h);

    // Ray parallel to the triangle plane.
    if a.abs() < EPSILON {
        return None;
    }

    let f = 1.0 / a;
    let s = ray.origin - v0;
    let u = f * s.dot(h);
    if !(0.0..=1.0).contains(&u) {
        return None;
    }

    let q = s.cross(edge1);
    let v = f * ray.dir.dot(q);
    if v < 0.0 || u + v > 1.0 {
        return None;
    }

    let t = f * edge2.dot(q);
    (t > EPSILON).then_some(t)
}

/// Nearest ray hit against an indexed triangle mesh.
pub fn pick_mesh(ray: &Ray, positions: &[[f32; 3]], indices: &[u32]) -> Option<Vec3> {
    let mut nearest: Option<f32> = None;
    for tri in indices.chunks_exact(3) {
        let [a, b, c] = [tri[0] as usize, tri[1] as usize, tri[2] as usize];
        let (Some(&v0), Some(&v1), Some(&v2)) =
            (positions.get(a), positions.get(b), positions.get(c))
        else {
            continue;
        };
        if let Some(t) = intersect_triangle(
            ray,
            Vec3::from_array(v0),
            Vec3::from_array(v1),
            Vec3::from_array(v2),
        ) {
            if nearest.is_none_or(|best| t < best) {
                nearest = Some(t);
            }
        }
    }
    nearest.map(|t| ray.at(t))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vec3;

    fn down_z_ray() -> Ray {
        Ray {
            origin: vec3(0.0, 0.0, 1.0),
            dir: vec3(0.0, 0.0, -1.0),
        }
    }

    // Unit triangle in the z=0 plane around the origin.
    const TRI: [Vec3; 3] = [
        Vec3::new(-1.0, -1.0, 0.0),
        Vec3::new(1.0, -1.0, 0.0),
        Vec3::new(0.0, 1.0, 0.0),
    ];

    #[test]
    fn triangle_hit_reports_distance() {
        let t = intersect_triangle(&down_z_ray(), TRI[0], TRI[1], TRI[2]).unwrap();
        assert!((t - 1.0).abs() < 1e-5);
    }

    #[test]
    fn triangle_miss_outside_barycentric_range() {
        let ray = Ray {
            origin: vec3(5.0, 5.0, 1.0),
            dir: vec3(0.0, 0.0, -1.0),
        };
        assert!(intersect_triangle(&ray, TRI[0], TRI[1], TRI[2]).is_none());
    }

    #[test]
    fn parallel_ray_misses() {
        let ray = Ray {
            origin: vec3(0.0, 0.0, 1.0),
            dir: vec3(1.0, 0.0, 0.0),
        };
        assert!(intersect_triangle(&ray, TRI[0], TRI[1], TRI[2]).is_none());
    }

    #[test]
    fn triangle_behind_origin_is_ignored() {
        let ray = Ray {
            origin: vec3(0.0, 0.0, -1.0),
            dir: vec3(0.0, 0.0, -1.0),
        };
        assert!(intersect_triangle(&ray, TRI[0], TRI[1], TRI[2]).is_none());
    }

    #[test]
    fn pick_mesh_returns_nearest_hit() {
        // Two stacked triangles; the z=0.5 one is closer to the ray origin.
        let positions = [
            [-1.0, -1.0, 0.0],
            [1.0, -1.0, 0.0],
            [0.0, 1.0, 0.0],
            [-1.0, -1.0, 0.5],
            [1.0, -1.0, 0.5],
            [0.0, 1.0, 0.5],
        ];
        let indices = [0, 1, 2, 3, 4, 5];
        let hit = pick_mesh(&down_z_ray(), &positions, &indices).unwrap();
        assert!((hit.z - 0.5).abs() < 1e-5);
    }

    #[test]
    fn pick_mesh_handles_no_hit() {
        let positions = [[10.0, 10.0, 0.0], [11.0, 10.0, 0.0], [10.0, 11.0, 0.0]];
        assert!(pick_mesh(&down_z_ray(), &positions, &[0, 1, 2]).is_none());
    }

    #[test]
    fn center_screen_ray_passes_through_target() {
        let cam = Camera::default();
        let viewport = Vec2::new(1280.0, 720.0);
        let ray = screen_ray(&cam, viewport * 0.5, viewport).unwrap();
        // Distance from the target to the ray line.
        let to_target = cam.target - ray.origin;
        let miss = (to_target - ray.dir * to_target.dot(ray.dir)).length();
        assert!(miss < 1e-3, "miss distance {miss}");
    }

    #[test]
    fn project_maps_target_to_viewport_center() {
        let cam = Camera::default().with_aspect(1280.0 / 720.0);
        let viewport = Vec2::new(1280.0, 720.0);
        let px = project(&cam, cam.target, viewport).unwrap();
        assert!((px.x - 640.0).abs() < 0.5);
        assert!((px.y - 360.0).abs() < 0.5);
    }

    #[test]
    fn project_rejects_points_behind_camera() {
        let cam = Camera::default();
        let behind = cam.eye() + (cam.eye() - cam.target);
        assert!(project(&cam, behind, Vec2::new(800.0, 600.0)).is_none());
    }

    #[test]
    fn project_and_screen_ray_agree() {
        let cam = Camera::default().with_aspect(1.5);
        let viewport = Vec2::new(1500.0, 1000.0);
        let world = vec3(0.3, -0.2, 0.4);
        let px = project(&cam, world, viewport).unwrap();
        let ray = screen_ray(&cam, px, viewport).unwrap();
        let to_point = world - ray.origin;
        let miss = (to_point - ray.dir * to_point.dot(ray.dir)).length();
        assert!(miss < 1e-3, "miss distance {miss}");
    }

    #[test]
    fn degenerate_viewport_yields_no_ray() {
        let cam = Camera::default();
        assert!(screen_ray(&cam, Vec2::ZERO, Vec2::ZERO).is_none());
    }
}
