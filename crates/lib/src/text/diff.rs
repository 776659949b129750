//! Myers O(ND) diff over code points, in linear space.
//!
//! Produces the minimal edit script between two strings as a list of
//! splices in source coordinates, ascending. Applying them from the last to
//! the first keeps every earlier position valid.

/// Replace `delete` code points at `pos` with `insert`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Splice {
    pub pos: usize,
    pub delete: usize,
    pub insert: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    Keep,
    Delete,
    Insert(char),
}

/// Compute the splices that turn `old` into `new`.
pub fn diff(old: &str, new: &str) -> Vec<Splice> {
    let a: Vec<char> = old.chars().collect();
    let b: Vec<char> = new.chars().collect();
    let mut steps = Vec::with_capacity(a.len().max(b.len()));
    diff_steps(&a, &b, &mut steps);
    group(0, &steps)
}

/// Strip the common affixes, then split the remainder at its middle snake
/// and recurse on both halves. Space stays linear in the input length.
fn diff_steps(a: &[char], b: &[char], out: &mut Vec<Step>) {
    let prefix = a.iter().zip(b).take_while(|(x, y)| x == y).count();
    out.extend(std::iter::repeat_n(Step::Keep, prefix));
    let (a, b) = (&a[prefix..], &b[prefix..]);

    let suffix = a
        .iter()
        .rev()
        .zip(b.iter().rev())
        .take_while(|(x, y)| x == y)
        .count();
    let a = &a[..a.len() - suffix];
    let b = &b[..b.len() - suffix];

    if a.is_empty() {
        out.extend(b.iter().map(|c| Step::Insert(*c)));
    } else if b.is_empty() {
        out.extend(std::iter::repeat_n(Step::Delete, a.len()));
    } else if let Some((x, y)) = middle_snake(a, b) {
        diff_steps(&a[..x], &b[..y], out);
        diff_steps(&a[x..], &b[y..], out);
    } else {
        out.extend(std::iter::repeat_n(Step::Delete, a.len()));
        out.extend(b.iter().map(|c| Step::Insert(*c)));
    }

    out.extend(std::iter::repeat_n(Step::Keep, suffix));
}

/// Run the forward and reverse searches towards each other and return the
/// point where the forward path of the first overlap ends.
fn middle_snake(a: &[char], b: &[char]) -> Option<(usize, usize)> {
    let n = a.len() as isize;
    let m = b.len() as isize;
    let max_d = (n + m + 1) / 2;
    let offset = max_d;
    // Diagonals reach offset + d + 1, so keep one spare slot.
    let v_len = (2 * max_d + 2) as usize;
    let mut v1 = vec![-1isize; v_len];
    let mut v2 = vec![-1isize; v_len];
    v1[(offset + 1) as usize] = 0;
    v2[(offset + 1) as usize] = 0;

    let delta = n - m;
    // With an odd delta the paths meet during a forward step.
    let front = delta % 2 != 0;
    let (mut k1start, mut k1end, mut k2start, mut k2end) = (0isize, 0isize, 0isize, 0isize);
    let in_bounds = |k: isize| k >= 0 && k < v_len as isize;

    for d in 0..max_d {
        let mut k1 = -d + k1start;
        while k1 <= d - k1end {
            let k1_offset = (offset + k1) as usize;
            let mut x1 = if k1 == -d || (k1 != d && v1[k1_offset - 1] < v1[k1_offset + 1]) {
                v1[k1_offset + 1]
            } else {
                v1[k1_offset - 1] + 1
            };
            let mut y1 = x1 - k1;
            while x1 < n && y1 < m && a[x1 as usize] == b[y1 as usize] {
                x1 += 1;
                y1 += 1;
            }
            v1[k1_offset] = x1;
            if x1 > n {
                k1end += 2;
            } else if y1 > m {
                k1start += 2;
            } else if front {
                let k2_offset = offset + delta - k1;
                if in_bounds(k2_offset) {
                    let x2 = v2[k2_offset as usize];
                    if x2 != -1 && x1 >= n - x2 {
                        return Some((x1 as usize, y1 as usize));
                    }
                }
            }
            k1 += 2;
        }

        let mut k2 = -d + k2start;
        while k2 <= d - k2end {
            let k2_offset = (offset + k2) as usize;
            let mut x2 = if k2 == -d || (k2 != d && v2[k2_offset - 1] < v2[k2_offset + 1]) {
                v2[k2_offset + 1]
            } else {
                v2[k2_offset - 1] + 1
            };
            let mut y2 = x2 - k2;
            while x2 < n && y2 < m && a[(n - x2 - 1) as usize] == b[(m - y2 - 1) as usize] {
                x2 += 1;
                y2 += 1;
            }
            v2[k2_offset] = x2;
            if x2 > n {
                k2end += 2;
            } else if y2 > m {
                k2start += 2;
            } else if !front {
                let k1_offset = offset + delta - k2;
                if in_bounds(k1_offset) {
                    let x1 = v1[k1_offset as usize];
                    if x1 != -1 && x1 >= n - x2 {
                        let y1 = offset + x1 - k1_offset;
                        return Some((x1 as usize, y1 as usize));
                    }
                }
            }
            k2 += 2;
        }
    }
    None
}

fn group(base: usize, steps: &[Step]) -> Vec<Splice> {
    let mut out = Vec::new();
    let mut pos = base;
    let mut current: Option<Splice> = None;
    for step in steps {
        match step {
            Step::Keep => {
                out.extend(current.take());
                pos += 1;
            }
            Step::Delete => {
                current
                    .get_or_insert_with(|| Splice {
                        pos,
                        delete: 0,
                        insert: String::new(),
                    })
                    .delete += 1;
                pos += 1;
            }
            Step::Insert(c) => current
                .get_or_insert_with(|| Splice {
                    pos,
                    delete: 0,
                    insert: String::new(),
                })
                .insert
                .push(*c),
        }
    }
    out.extend(current);
    out
}
