//! Animated hand-over from old to new node positions.
//!
//! Times are milliseconds. While the graph is still growing, refresh layouts
//! arrive in bursts. A refresh inside the stale window only gets what is left
//! of the animation started at `last_transition`.

/// Default animation length.
pub const DEFAULT_DURATION_MS: f64 = 500.0;
/// Refreshes closer than this to the last full transition are shortened.
pub const STALE_THRESHOLD_MS: f64 = 4000.0;

#[derive(Clone, Debug)]
pub struct TransitionConfig {
	pub duration: f64,
	pub stale_threshold: f64,
}

impl Default for TransitionConfig {
	fn default() -> Self {
		Self {
			duration: DEFAULT_DURATION_MS,
			stale_threshold: STALE_THRESHOLD_MS,
		}
	}
}

/// Linear interpolation of every node between two position sets, indexed by
/// node insertion order.
#[derive(Clone, Debug, Default)]
pub struct TransitionDriver {
	config: TransitionConfig,
	last_transition: Option<f64>,
	start: f64,
	duration: f64,
	from: Vec<(f64, f64)>,
	to: Vec<(f64, f64)>,
}

impl TransitionDriver {
	pub fn new(config: TransitionConfig) -> Self {
		Self {
			config,
			..Default::default()
		}
	}

	#[cfg(test)]
	pub(crate) fn last_transition(&self) -> Option<f64> {
		self.last_transition
	}

	/// Duration for a transition starting at `now`, updating the stored
	/// timestamp unless the call is a refresh inside the stale window.
	pub fn next_duration(&mut self, now: f64, refresh: bool) -> f64 {
		let shorten_by = match self.last_transition {
			Some(last) if refresh && now - last <= self.config.stale_threshold => {
				(now - last).max(0.0)
			}
			_ => {
				self.last_transition = Some(now);
				0.0
			}
		};
		(self.config.duration - shorten_by).max(0.0)
	}

	/// Starts animating from `from` to `to`. Returns the applied duration.
	pub fn start(
		&mut self,
		now: f64,
		refresh: bool,
		from: Vec<(f64, f64)>,
		to: Vec<(f64, f64)>,
	) -> f64 {
		self.duration = self.next_duration(now, refresh);
		self.start = now;
		self.from = from;
		self.to = to;
		self.duration
	}

	/// Drops any animation and shows `positions` as they are.
	pub fn settle(&mut self, positions: Vec<(f64, f64)>) {
		self.from = positions.clone();
		self.to = positions;
		self.duration = 0.0;
	}

	/// Places a single node without animating it.
	pub fn place(&mut self, idx: usize, pos: (f64, f64)) {
		if let Some(p) = self.from.get_mut(idx) {
			*p = pos;
		}
		if let Some(p) = self.to.get_mut(idx) {
			*p = pos;
		}
	}

	fn progress(&self, now: f64) -> f64 {
		if self.duration <= 0.0 {
			1.0
		} else {
			((now - self.start) / self.duration).clamp(0.0, 1.0)
		}
	}

	pub fn is_animating(&self, now: f64) -> bool {
		self.progress(now) < 1.0
	}

	/// Interpolated position of node `idx`, or `None` for nodes the current
	/// transition does not know about.
	pub fn position(&self, idx: usize, now: f64) -> Option<(f64, f64)> {
		let t = self.progress(now);
		let &(tx, ty) = self.to.get(idx)?;
		if t >= 1.0 {
			return Some((tx, ty));
		}
		let &(fx, fy) = self.from.get(idx).unwrap_or(&(tx, ty));
		Some((fx + (tx - fx) * t, fy + (ty - fy) * t))
	}

	/// Positions for every node; nodes added after the transition began are
	/// shown where `fallback` puts them.
	pub fn sample(&self, now: f64, fallback: &[(f64, f64)]) -> Vec<(f64, f64)> {
		fallback
			.iter()
			.enumerate()
			.map(|(idx, &pos)| self.position(idx, now).unwrap_or(pos))
			.collect()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	const T0: f64 = 10_000.0;

	fn driver_started_at(t0: f64) -> TransitionDriver {
		let mut driver = TransitionDriver::new(TransitionConfig::default());
		assert_eq!(driver.next_duration(t0, false), 500.0);
		driver
	}

	#[test]
	fn first_transition_uses_full_duration() {
		let mut driver = TransitionDriver::new(TransitionConfig::default());
		assert_eq!(driver.next_duration(T0, true), 500.0);
		assert_eq!(driver.last_transition(), Some(T0));
	}

	#[test]
	fn refresh_inside_window_is_shortened() {
		for delta in [0.0, 120.0, 499.0, 500.0, 2500.0, 4000.0] {
			let mut driver = driver_started_at(T0);
			let expected = (500.0_f64 - delta).max(0.0);
			assert_eq!(driver.next_duration(T0 + delta, true), expected, "delta {delta}");
			assert_eq!(driver.last_transition(), Some(T0));
		}
	}

	#[test]
	fn refresh_outside_window_resets_clock() {
		let mut driver = driver_started_at(T0);
		assert_eq!(driver.next_duration(T0 + 4000.5, true), 500.0);
		assert_eq!(driver.last_transition(), Some(T0 + 4000.5));
	}

	#[test]
	fn full_layout_always_resets_clock() {
		let mut driver = driver_started_at(T0);
		assert_eq!(driver.next_duration(T0 + 100.0, false), 500.0);
		assert_eq!(driver.last_transition(), Some(T0 + 100.0));
	}

	#[test]
	fn burst_of_refreshes_shares_one_clock() {
		let mut driver = driver_started_at(T0);
		assert_eq!(driver.next_duration(T0 + 100.0, true), 400.0);
		assert_eq!(driver.next_duration(T0 + 300.0, true), 200.0);
		assert_eq!(driver.next_duration(T0 + 700.0, true), 0.0);
	}

	#[test]
	fn interpolates_linearly() {
		let mut driver = TransitionDriver::new(TransitionConfig::default());
		driver.start(0.0, false, vec![(0.0, 0.0)], vec![(100.0, 50.0)]);
		assert_eq!(driver.position(0, 0.0), Some((0.0, 0.0)));
		assert_eq!(driver.position(0, 250.0), Some((50.0, 25.0)));
		assert_eq!(driver.position(0, 500.0), Some((100.0, 50.0)));
		assert_eq!(driver.position(0, 9000.0), Some((100.0, 50.0)));
		assert!(driver.is_animating(250.0));
		assert!(!driver.is_animating(500.0));
	}

	#[test]
	fn zero_duration_jumps_and_new_nodes_use_fallback() {
		let mut driver = driver_started_at(0.0);
		let applied = driver.start(600.0, true, vec![(0.0, 0.0)], vec![(10.0, 10.0)]);
		assert_eq!(applied, 0.0);
		let shown = driver.sample(600.0, &[(1.0, 1.0), (7.0, 8.0)]);
		assert_eq!(shown, vec![(10.0, 10.0), (7.0, 8.0)]);
	}

	#[test]
	fn settle_and_place_stop_animation() {
		let mut driver = TransitionDriver::new(TransitionConfig::default());
		driver.start(0.0, false, vec![(0.0, 0.0), (0.0, 0.0)], vec![(9.0, 9.0), (9.0, 9.0)]);
		driver.place(1, (3.0, 4.0));
		assert_eq!(driver.position(1, 100.0), Some((3.0, 4.0)));
		driver.settle(vec![(1.0, 2.0), (3.0, 4.0)]);
		assert!(!driver.is_animating(1.0));
		assert_eq!(driver.position(0, 1.0), Some((1.0, 2.0)));
	}
}
