//! Tidy placement of an ordered tree inside a fixed size.
//!
//! Subtrees are packed left to right by comparing contours level by level
//! (Reingold–Tilford): siblings sit one unit apart, cousins two. When a
//! subtree has to move right, the siblings between it and the subtree it
//! collided with move by an even share of the push, as in Walker's
//! algorithm. A parent is centred over its first and last child. The result is then stretched so the
//! outermost nodes sit half a gap in from the edges of `width`, and each level
//! gets an equal share of `height`.

/// An ordered tree stored as child lists. Index 0 is the root.
#[derive(Clone, Debug, Default)]
pub struct OrderedTree {
	children: Vec<Vec<usize>>,
	parent: Vec<Option<usize>>,
}

impl OrderedTree {
	/// A tree holding only the root.
	pub fn new() -> Self {
		Self {
			children: vec![Vec::new()],
			parent: vec![None],
		}
	}

	/// Appends a child under `parent` and returns its index.
	pub fn add_child(&mut self, parent: usize) -> usize {
		let idx = self.children.len();
		self.children.push(Vec::new());
		self.parent.push(Some(parent));
		if let Some(siblings) = self.children.get_mut(parent) {
			siblings.push(idx);
		}
		idx
	}

	pub fn len(&self) -> usize {
		self.children.len()
	}

	pub fn children(&self, idx: usize) -> &[usize] {
		self.children.get(idx).map(Vec::as_slice).unwrap_or(&[])
	}

	fn separation(&self, a: usize, b: usize) -> f64 {
		if self.parent.get(a) == self.parent.get(b) {
			1.0
		} else {
			2.0
		}
	}
}

/// Per-level extents of a subtree, relative to its root.
struct Contour {
	left: Vec<f64>,
	right: Vec<f64>,
}

/// Places `tree` within `[0, width] x [0, height]`. Returns `(x, y)` per tree
/// index; `y` is `depth * height / max_depth`.
pub fn tidy_layout(tree: &OrderedTree, width: f64, height: f64) -> Vec<(f64, f64)> {
	let n = tree.len();
	let mut offset = vec![0.0; n];
	pack(tree, 0, &mut offset);

	let mut x = vec![0.0; n];
	let mut depth = vec![0usize; n];
	let mut stack = vec![0usize];
	while let Some(v) = stack.pop() {
		for &c in tree.children(v) {
			x[c] = x[v] + offset[c];
			depth[c] = depth[v] + 1;
			stack.push(c);
		}
	}

	let mut left = 0;
	let mut right = 0;
	for v in 0..n {
		if x[v] < x[left] {
			left = v;
		}
		if x[v] > x[right] {
			right = v;
		}
	}
	let max_depth = depth.iter().copied().max().unwrap_or(0);

	let tx = tree.separation(left, right) / 2.0 - x[left];
	let span = x[right] + tree.separation(right, left) / 2.0 + tx;
	let kx = if span > 0.0 { width / span } else { 0.0 };
	let ky = height / max_depth.max(1) as f64;

	(0..n)
		.map(|v| ((x[v] + tx) * kx, depth[v] as f64 * ky))
		.collect()
}

/// Packs the children of `v` and returns the contour of its subtree. Child
/// offsets relative to their parent are written into `offset`.
fn pack(tree: &OrderedTree, v: usize, offset: &mut [f64]) -> Contour {
	let children = tree.children(v);
	if children.is_empty() {
		return Contour {
			left: vec![0.0],
			right: vec![0.0],
		};
	}

	let mut placed: Vec<f64> = Vec::with_capacity(children.len());
	let mut contours: Vec<Contour> = Vec::with_capacity(children.len());

	for &child in children {
		let contour = pack(tree, child, offset);
		let k = placed.len();
		let mut pos = placed.last().map_or(0.0, |&prev| prev + 1.0);
		for (level, &left) in contour.left.iter().enumerate() {
			// Rightmost edge of the siblings placed so far, and whose it is.
			let Some((edge, owner)) = placed
				.iter()
				.zip(&contours)
				.enumerate()
				.filter_map(|(j, (&p, c))| c.right.get(level).map(|&r| (p + r, j)))
				.max_by(|a, b| a.0.total_cmp(&b.0))
			else {
				break;
			};
			let gap = if level == 0 { 1.0 } else { 2.0 };
			let shift = edge + gap - (pos + left);
			if shift > 0.0 {
				// Spread the push over the siblings between `owner` and `k`.
				let span = (k - owner) as f64;
				for (j, p) in placed.iter_mut().enumerate().skip(owner + 1) {
					*p += shift * (j - owner) as f64 / span;
				}
				pos += shift;
			}
		}
		placed.push(pos);
		contours.push(contour);
	}

	let first = placed.first().copied().unwrap_or(0.0);
	let last = placed.last().copied().unwrap_or(0.0);
	let mid = (first + last) / 2.0;

	let mut left: Vec<f64> = vec![0.0];
	let mut right: Vec<f64> = vec![0.0];
	for ((&child, pos), contour) in children.iter().zip(placed).zip(contours) {
		let rel = pos - mid;
		offset[child] = rel;
		for (level, (&l, &r)) in contour.left.iter().zip(&contour.right).enumerate() {
			let depth = level + 1;
			if depth < left.len() {
				left[depth] = left[depth].min(rel + l);
				right[depth] = right[depth].max(rel + r);
			} else {
				left.push(rel + l);
				right.push(rel + r);
			}
		}
	}
	Contour { left, right }
}

#[cfg(test)]
mod tests {
	use super::*;

	fn close(a: f64, b: f64) -> bool {
		(a - b).abs() < 1e-9
	}

	#[test]
	fn single_node_sits_in_the_middle() {
		let tree = OrderedTree::new();
		let pos = tidy_layout(&tree, 100.0, 50.0);
		assert_eq!(pos.len(), 1);
		assert!(close(pos[0].0, 50.0));
		assert!(close(pos[0].1, 0.0));
	}

	#[test]
	fn parent_is_centred_over_children() {
		let mut tree = OrderedTree::new();
		let a = tree.add_child(0);
		let b = tree.add_child(0);
		let pos = tidy_layout(&tree, 300.0, 100.0);
		assert!(close(pos[0].0, (pos[a].0 + pos[b].0) / 2.0));
		assert!(pos[a].0 < pos[b].0);
		// Two siblings one unit apart, half a unit of margin each side.
		assert!(close(pos[a].0, 75.0));
		assert!(close(pos[b].0, 225.0));
		assert!(close(pos[a].1, 100.0));
	}

	#[test]
	fn levels_share_the_height() {
		let mut tree = OrderedTree::new();
		let a = tree.add_child(0);
		let b = tree.add_child(a);
		let c = tree.add_child(b);
		let pos = tidy_layout(&tree, 10.0, 90.0);
		let ys: Vec<f64> = [0, a, b, c].iter().map(|&i| pos[i].1).collect();
		assert_eq!(ys, vec![0.0, 30.0, 60.0, 90.0]);
	}

	#[test]
	fn cousins_do_not_overlap() {
		// root -> (a -> a1, a2), (b -> b1, b2)
		let mut tree = OrderedTree::new();
		let a = tree.add_child(0);
		let b = tree.add_child(0);
		let a1 = tree.add_child(a);
		let a2 = tree.add_child(a);
		let b1 = tree.add_child(b);
		let b2 = tree.add_child(b);
		let pos = tidy_layout(&tree, 1000.0, 100.0);
		assert!(pos[a1].0 < pos[a2].0);
		assert!(pos[a2].0 < pos[b1].0);
		assert!(pos[b1].0 < pos[b2].0);
		// Cousin gap is twice the sibling gap.
		let sibling = pos[a2].0 - pos[a1].0;
		let cousin = pos[b1].0 - pos[a2].0;
		assert!(close(cousin, 2.0 * sibling));
		for &(x, _) in &pos {
			assert!((0.0..=1000.0).contains(&x));
		}
	}

	#[test]
	fn small_subtree_between_wide_ones_is_centred() {
		// root -> (a -> a1, a2, a3), b, (c -> c1, c2, c3)
		let mut tree = OrderedTree::new();
		let a = tree.add_child(0);
		let b = tree.add_child(0);
		let c = tree.add_child(0);
		for parent in [a, c] {
			for _ in 0..3 {
				tree.add_child(parent);
			}
		}
		let pos = tidy_layout(&tree, 1000.0, 100.0);
		let (ab, bc) = (pos[b].0 - pos[a].0, pos[c].0 - pos[b].0);
		assert!(ab > 0.0);
		assert!(close(ab, bc));
		assert!(close(pos[0].0, pos[b].0));
	}

	#[test]
	fn push_is_shared_by_every_sibling_in_between() {
		// root -> (a -> a1, a2, a3), b, c, (d -> d1, d2, d3)
		let mut tree = OrderedTree::new();
		let a = tree.add_child(0);
		let b = tree.add_child(0);
		let c = tree.add_child(0);
		let d = tree.add_child(0);
		for parent in [a, d] {
			for _ in 0..3 {
				tree.add_child(parent);
			}
		}
		let pos = tidy_layout(&tree, 1000.0, 100.0);
		let gaps: Vec<f64> = [a, b, c, d].windows(2).map(|w| pos[w[1]].0 - pos[w[0]].0).collect();
		assert!(close(gaps[0], gaps[1]));
		assert!(close(gaps[1], gaps[2]));
	}
}
