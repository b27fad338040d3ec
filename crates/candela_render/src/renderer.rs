//! Row-parallel render loop.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Instant;

use candela_core::{CancelToken, Scene};
use candela_math::Camera;

use crate::framebuffer::{pack_color, Frame};

/// One fewer worker than the machine reports, leaving a core for the
/// display shell; always at least one.
fn worker_count() -> usize {
    thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(2)
        .saturating_sub(1)
        .max(1)
}

/// Render the scene through the camera into the frame, blocking until every
/// row is done or the token is cancelled.
///
/// Workers claim whole scanlines from a shared cursor and commit each row
/// only after it is fully traced, so cancellation never leaves a partially
/// written row behind.
pub fn render(scene: &Scene, camera: &Camera, frame: &Frame, cancel: &CancelToken) {
    let width = frame.width();
    let height = frame.height();
    let workers = worker_count();
    let cursor = AtomicU32::new(0);
    let start = Instant::now();

    thread::scope(|s| {
        for _ in 0..workers {
            s.spawn(|| {
                let mut row = vec![0u32; width as usize];
                loop {
                    let y = cursor.fetch_add(1, Ordering::Relaxed);
                    if y >= height || cancel.is_cancelled() {
                        break;
                    }
                    for (x, slot) in row.iter_mut().enumerate() {
                        let ray = camera.frame_ray(x as f64 + 0.5, y as f64 + 0.5);
                        *slot = pack_color(scene.trace(&ray, 0, cancel));
                    }
                    // A cancellation mid-row blanks traced pixels; dropping
                    // the row keeps the frame free of torn scanlines.
                    if cancel.is_cancelled() {
                        break;
                    }
                    for (x, &pixel) in row.iter().enumerate() {
                        frame.put_pixel(x as u32, y, pixel);
                    }
                }
            });
        }
    });

    log::debug!(
        "rendered {}x{} with {} workers in {:.2?}{}",
        width,
        height,
        workers,
        start.elapsed(),
        if cancel.is_cancelled() { " (cancelled)" } else { "" }
    );
}

/// A render running on a background thread.
///
/// Dropping the job detaches the render; it keeps writing into the shared
/// frame until it finishes or its token is cancelled.
pub struct RenderJob {
    handle: thread::JoinHandle<()>,
    token: CancelToken,
}

impl RenderJob {
    /// Start rendering on a new thread.
    pub fn spawn(scene: Arc<Scene>, camera: Camera, frame: Arc<Frame>) -> Self {
        let token = CancelToken::default();
        let worker_token = token.clone();
        let handle = thread::spawn(move || render(&scene, &camera, &frame, &worker_token));
        Self { handle, token }
    }

    /// Request cancellation; workers stop at their next row boundary.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Block until the render thread exits.
    pub fn wait(self) {
        let _ = self.handle.join();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use candela_core::{Color, Material, PointLight, Sphere};
    use candela_math::dvec3;

    fn test_scene() -> Scene {
        let _ = env_logger::builder().is_test(true).try_init();
        let mut scene = Scene::new();
        scene.add(Box::new(Sphere::new(
            dvec3(0.0, 0.0, 0.0),
            1.0,
            Material::default(),
        )));
        scene.add_light(PointLight::new(dvec3(5.0, 5.0, 5.0), Color::ONE));
        scene
    }

    fn test_camera(w: u32, h: u32) -> Camera {
        let mut cam = Camera::new();
        cam.resize(w, h);
        cam.set_loc_at_up(dvec3(0.0, 0.0, 5.0), dvec3(0.0, 0.0, 0.0), dvec3(0.0, 1.0, 0.0));
        cam
    }

    #[test]
    fn test_render_is_deterministic() {
        let scene = test_scene();
        let camera = test_camera(16, 16);
        let a = Frame::new(16, 16);
        let b = Frame::new(16, 16);
        render(&scene, &camera, &a, &CancelToken::default());
        render(&scene, &camera, &b, &CancelToken::default());
        for y in 0..16 {
            for x in 0..16 {
                assert_eq!(a.get_pixel(x, y), b.get_pixel(x, y), "pixel ({x}, {y}) differs");
            }
        }
    }

    #[test]
    fn test_render_hits_sphere_in_center() {
        let scene = test_scene();
        let camera = test_camera(17, 17);
        let frame = Frame::new(17, 17);
        render(&scene, &camera, &frame, &CancelToken::default());
        let background = pack_color(scene.background);
        assert_ne!(frame.get_pixel(8, 8), background);
        assert_eq!(frame.get_pixel(0, 0), background);
    }

    #[test]
    fn test_cancelled_render_writes_nothing() {
        let scene = test_scene();
        let camera = test_camera(8, 8);
        let frame = Frame::new(8, 8);
        let cancel = CancelToken::default();
        cancel.cancel();
        render(&scene, &camera, &frame, &cancel);
        for y in 0..8 {
            for x in 0..8 {
                assert_eq!(frame.get_pixel(x, y), 0);
            }
        }
    }

    #[test]
    fn test_background_job_completes() {
        let scene = Arc::new(test_scene());
        let frame = Arc::new(Frame::new(8, 8));
        let job = RenderJob::spawn(Arc::clone(&scene), test_camera(8, 8), Arc::clone(&frame));
        job.wait();
        assert_ne!(frame.get_pixel(4, 4), 0);
    }

    #[test]
    fn test_job_cancel_terminates() {
        let scene = Arc::new(test_scene());
        let frame = Arc::new(Frame::new(64, 64));
        let job = RenderJob::spawn(Arc::clone(&scene), test_camera(64, 64), Arc::clone(&frame));
        job.cancel();
        job.wait();
    }
}
