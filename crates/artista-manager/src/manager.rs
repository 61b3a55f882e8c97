//! Image rotation over a bank of screens.
//!
//! Screens are addressed by display id. Images wait in a FIFO; each screen
//! keeps its image for at least the image's duration, after which the image
//! goes to the back of the queue and the screen takes the head.

use std::collections::VecDeque;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::{bail, Context, Result};
use artista_hw::{Controller, ScreenBus};
use rand::seq::SliceRandom;
use tracing::{debug, error, info};

use crate::config::Config;

/// A queued or displayed image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Image {
    pub name: String,
    pub file: String,
    pub duration: Duration,
    pub shown_at: Option<Instant>,
}

impl Image {
    pub fn new(name: &str, file: &str, duration: Duration) -> Self {
        Self {
            name: name.to_string(),
            file: file.to_string(),
            duration,
            shown_at: None,
        }
    }

    /// True once the image has been on screen longer than its duration.
    pub fn expired(&self, now: Instant) -> bool {
        self.shown_at
            .is_some_and(|shown| now.saturating_duration_since(shown) > self.duration)
    }
}

/// One managed screen.
#[derive(Debug, Clone)]
pub struct ScreenSlot {
    pub id: String,
    pub image: Option<Image>,
    /// Set until a show succeeds, and again whenever one fails.
    pub offline: bool,
}

/// Rotation state for a bank of screens.
pub struct Manager<B> {
    controller: Controller<B>,
    image_dir: PathBuf,
    random_start: bool,
    debug: bool,
    screens: Vec<ScreenSlot>,
    fifo: VecDeque<Image>,
    pos: usize,
}

impl<B: ScreenBus> Manager<B> {
    /// Creates a manager for the screens and images named in `config`.
    pub fn new(controller: Controller<B>, config: &Config) -> Self {
        let screens = config
            .screens
            .iter()
            .map(|id| ScreenSlot {
                id: id.clone(),
                image: None,
                offline: true,
            })
            .collect();

        let fifo = config
            .images
            .iter()
            .map(|(name, image)| Image::new(name, &image.file, Duration::from_secs(image.duration)))
            .collect();

        Self {
            controller,
            image_dir: config.image_dir.clone(),
            random_start: config.random_start,
            debug: config.debug,
            screens,
            fifo,
            pos: 0,
        }
    }

    pub fn screens(&self) -> &[ScreenSlot] {
        &self.screens
    }

    pub fn queue(&self) -> &VecDeque<Image> {
        &self.fifo
    }

    /// Gives every screen without an image the next queued one.
    pub fn fill(&mut self, now: Instant) {
        if self.random_start {
            self.fifo
                .make_contiguous()
                .shuffle(&mut rand::thread_rng());
        }

        for i in 0..self.screens.len() {
            if self.screens[i].image.is_some() {
                continue;
            }
            match self.fifo.pop_front() {
                Some(image) => {
                    self.show(i, image, now);
                }
                None => break,
            }
        }
    }

    /// Runs one rotation step.
    pub fn tick(&mut self, now: Instant) -> Result<()> {
        if self.debug {
            self.log_assignments();
            return Ok(());
        }

        self.check()?;
        self.find_new_screens()?;
        self.switch(now);
        Ok(())
    }

    /// Fails when no image is left to rotate in.
    pub fn check(&self) -> Result<()> {
        if self.fifo.is_empty() {
            error!("Image queue is empty, stopping");
            bail!("image queue is empty");
        }
        Ok(())
    }

    /// Swaps the image of the first expired screen, scanning from where the
    /// previous tick stopped.
    pub fn switch(&mut self, now: Instant) {
        if self.screens.is_empty() {
            return;
        }
        if self.pos >= self.screens.len() - 1 {
            self.pos = 0;
        }

        for i in self.pos..self.screens.len() {
            self.pos = i;
            let expired = self.screens[i]
                .image
                .as_ref()
                .is_some_and(|image| image.expired(now));
            if !expired {
                continue;
            }

            if let Some(old) = self.screens[i].image.take() {
                self.fifo.push_back(old);
            }
            if let Some(next) = self.fifo.pop_front() {
                self.show(i, next, now);
            }
            break;
        }
    }

    /// Labels a freshly attached, unlabelled screen with the lowest id of an
    /// offline screen in the bank.
    pub fn find_new_screens(&self) -> Result<()> {
        let ids = self
            .controller
            .ids()
            .context("Failed to get the screen list")?;

        let bank_has_blank = self.screens.iter().any(|s| s.id.is_empty());
        let has_new = !bank_has_blank && ids.iter().any(|id| id.is_blank());
        if !has_new {
            return Ok(());
        }

        let Some(new_id) = self
            .screens
            .iter()
            .filter(|s| s.offline)
            .map(|s| s.id.as_str())
            .min()
        else {
            return Ok(());
        };

        info!("Relabelling '' as '{}'", new_id);
        if let Err(e) = self.controller.set_id("", new_id) {
            error!("Failed to relabel '' as '{}': {}", new_id, e);
        }
        Ok(())
    }

    fn show(&mut self, index: usize, mut image: Image, now: Instant) {
        image.shown_at = Some(now);
        let path = self.image_dir.join(&image.file);
        let screen = &mut self.screens[index];
        screen.image = Some(image);

        if !path.exists() {
            error!("Image file does not exist: {}", path.display());
            return;
        }

        match self.controller.show_by_id(&path, &screen.id) {
            Ok(bytes) => {
                debug!("'{}' now shows {} ({} bytes)", screen.id, path.display(), bytes);
                screen.offline = false;
            }
            Err(e) => {
                debug!("Show on '{}' failed: {}", screen.id, e);
                error!("Screen '{}' is down!", screen.id);
                screen.offline = true;
            }
        }
    }

    fn log_assignments(&self) {
        let line = self
            .screens
            .iter()
            .map(|s| {
                let image = s.image.as_ref().map_or("-", |i| i.name.as_str());
                format!("[{}:{}]", s.id, image)
            })
            .collect::<Vec<_>>()
            .join(" ");
        info!("{}", line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ImageConfig;
    use artista_hw::memory::MemoryBus;
    use image::{DynamicImage, Rgb, RgbImage};

    struct Fixture {
        _dir: tempfile::TempDir,
        config: Config,
        bus: MemoryBus,
    }

    /// Three screens, four images each with a distinct solid color.
    fn fixture() -> Fixture {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config {
            image_dir: dir.path().to_path_buf(),
            screens: vec!["a".to_string(), "b".to_string(), "c".to_string()],
            ..Config::default()
        };
        for (name, shade) in [("p1", 10u8), ("p2", 80), ("p3", 160), ("p4", 240)] {
            let file = format!("{}.png", name);
            DynamicImage::ImageRgb8(RgbImage::from_pixel(2, 2, Rgb([shade, 0, 0])))
                .save(dir.path().join(&file))
                .unwrap();
            config.images.insert(
                name.to_string(),
                ImageConfig {
                    file,
                    duration: 10,
                },
            );
        }
        let bus = MemoryBus::new()
            .with_screen(4, 4, "a")
            .with_screen(4, 4, "b")
            .with_screen(4, 4, "c");
        Fixture {
            _dir: dir,
            config,
            bus,
        }
    }

    fn names(manager: &Manager<MemoryBus>) -> Vec<Option<String>> {
        manager
            .screens()
            .iter()
            .map(|s| s.image.as_ref().map(|i| i.name.clone()))
            .collect()
    }

    #[test]
    fn test_fill_assigns_in_queue_order() {
        let f = fixture();
        let mut manager = Manager::new(Controller::new(f.bus.clone()), &f.config);
        let now = Instant::now();
        manager.fill(now);

        assert_eq!(
            names(&manager),
            vec![Some("p1".into()), Some("p2".into()), Some("p3".into())]
        );
        assert_eq!(manager.queue().len(), 1);
        assert!(manager.screens().iter().all(|s| !s.offline));
        for i in 0..3 {
            assert_eq!(f.bus.screen(i).unwrap().writes, 1);
        }
    }

    #[test]
    fn test_random_start_keeps_every_image() {
        let mut f = fixture();
        f.config.random_start = true;
        let mut manager = Manager::new(Controller::new(f.bus.clone()), &f.config);
        manager.fill(Instant::now());

        let mut all: Vec<String> = names(&manager).into_iter().flatten().collect();
        all.extend(manager.queue().iter().map(|i| i.name.clone()));
        all.sort();
        assert_eq!(all, vec!["p1", "p2", "p3", "p4"]);
    }

    #[test]
    fn test_missing_screen_goes_offline() {
        let mut f = fixture();
        f.config.screens.push("d".to_string());
        f.config
            .images
            .insert("p5".to_string(), ImageConfig { file: "p1.png".to_string(), duration: 10 });
        let mut manager = Manager::new(Controller::new(f.bus.clone()), &f.config);
        manager.fill(Instant::now());

        let d = &manager.screens()[3];
        assert!(d.offline);
        assert!(d.image.is_some());
    }

    #[test]
    fn test_missing_file_keeps_screen_offline() {
        let mut f = fixture();
        f.config.images.insert(
            "p0".to_string(),
            ImageConfig {
                file: "nope.png".to_string(),
                duration: 10,
            },
        );
        let mut manager = Manager::new(Controller::new(f.bus.clone()), &f.config);
        manager.fill(Instant::now());

        assert_eq!(manager.screens()[0].image.as_ref().unwrap().name, "p0");
        assert!(manager.screens()[0].offline);
        assert_eq!(f.bus.screen(0).unwrap().writes, 0);
    }

    #[test]
    fn test_switch_waits_for_duration() {
        let f = fixture();
        let mut manager = Manager::new(Controller::new(f.bus.clone()), &f.config);
        let start = Instant::now();
        manager.fill(start);

        manager.switch(start + Duration::from_secs(5));
        assert_eq!(manager.queue().len(), 1);
        assert_eq!(manager.queue()[0].name, "p4");
    }

    #[test]
    fn test_switch_rotates_one_screen_per_tick() {
        let f = fixture();
        let mut manager = Manager::new(Controller::new(f.bus.clone()), &f.config);
        let start = Instant::now();
        manager.fill(start);

        let later = start + Duration::from_secs(11);
        manager.switch(later);
        assert_eq!(
            names(&manager),
            vec![Some("p4".into()), Some("p2".into()), Some("p3".into())]
        );
        assert_eq!(manager.queue()[0].name, "p1");
        assert_eq!(f.bus.screen(0).unwrap().writes, 2);

        // Screen 0 is fresh again, so the next expired screen is 1
        manager.switch(later);
        assert_eq!(
            names(&manager),
            vec![Some("p4".into()), Some("p1".into()), Some("p3".into())]
        );

        manager.switch(later);
        assert_eq!(names(&manager)[2], Some("p2".into()));
    }

    #[test]
    fn test_check_empty_queue_is_fatal() {
        let mut f = fixture();
        f.config.images.clear();
        let mut manager = Manager::new(Controller::new(f.bus.clone()), &f.config);
        manager.fill(Instant::now());
        assert!(manager.check().is_err());
        assert!(manager.tick(Instant::now()).is_err());
    }

    #[test]
    fn test_new_blank_screen_takes_lowest_offline_id() {
        let f = fixture();
        // "c" was swapped for a screen without an id
        let controller = Controller::new(f.bus.clone());
        controller.set_id_by_index("2", "").unwrap();

        let mut manager = Manager::new(controller, &f.config);
        manager.fill(Instant::now());
        assert!(manager.screens()[2].offline);

        manager.find_new_screens().unwrap();
        assert_eq!(f.bus.ids(), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_failed_relabel_is_not_fatal() {
        let f = fixture();
        let controller = Controller::new(f.bus.clone());
        controller.set_id_by_index("2", "").unwrap();
        f.bus.set_id_locked(2, true);

        let mut manager = Manager::new(controller, &f.config);
        let now = Instant::now();
        manager.fill(now);

        manager.find_new_screens().unwrap();
        assert_eq!(f.bus.ids(), vec!["a", "b", ""]);
        manager.tick(now).unwrap();
    }

    #[test]
    fn test_lost_bus_stops_the_service() {
        let f = fixture();
        let mut manager = Manager::new(Controller::new(f.bus.clone()), &f.config);
        let now = Instant::now();
        manager.fill(now);
        manager.tick(now).unwrap();

        f.bus.set_offline(true);
        assert!(manager.find_new_screens().is_err());
        assert!(manager.tick(now).is_err());
    }

    #[test]
    fn test_no_relabel_without_offline_screens() {
        let f = fixture();
        f.bus.attach(4, 4, "");
        let mut manager = Manager::new(Controller::new(f.bus.clone()), &f.config);
        manager.fill(Instant::now());

        manager.find_new_screens().unwrap();
        assert_eq!(f.bus.ids(), vec!["a", "b", "c", ""]);
    }

    #[test]
    fn test_debug_tick_does_not_touch_screens() {
        let mut f = fixture();
        f.config.debug = true;
        f.config.images.clear();
        let mut manager = Manager::new(Controller::new(f.bus.clone()), &f.config);
        manager.tick(Instant::now()).unwrap();
        assert_eq!(f.bus.screen(0).unwrap().writes, 0);
    }
}
