use crate::helpe::*;

/// Frame contents right after one reference was served.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HistoryStep<P> {
    /// One entry per physical frame, `None` while the frame is empty.
    pub frames:     Vec<Option<P>>,
    pub is_fault:   bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct PagingOutcome<P> {
    pub policy:         ReplacementPolicy,
    /// One step per reference, in stream order.
    pub history:        Vec<HistoryStep<P>>,
    pub fault_count:    usize,
}

impl<P> PagingOutcome<P> {
    pub fn hit_count(&self) -> usize {
        self.history.len() - self.fault_count
    }

    /// 0 for an empty stream.
    pub fn hit_ratio(&self) -> f64 {
        if self.history.is_empty() {
            0.0
        } else { self.hit_count() as f64 / self.history.len() as f64 }
    }
}

impl<P: fmt::Display> fmt::Display for PagingOutcome<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Policy:\t{}", self.policy)?;
        for (step, h) in self.history.iter().enumerate() {
            let frames = h.frames.iter()
                .map(|slot| match slot {
                    Some(page)  => format!("{page:>3}"),
                    None        => String::from("  -"),
                })
                .join(" |");
            writeln!(f, "{:>4}: |{frames} |{}", step + 1, if h.is_fault { " F" } else { "" })?;
        }
        write!(
            f,
            "Faults:\t{}\nHit ratio:\t{:.2}%",
            self.fault_count,
            self.hit_ratio() * 100.0,
        )
    }
}

/// Replays `references` against `frames_count` initially empty frames.
///
/// A fault fills the first empty frame if there is one; otherwise the
/// policy's victim gives up its frame, and the newcomer takes that very
/// frame. Pages never move between frames, so each [HistoryStep] shows
/// the physical layout.
pub fn run_page_replacement<P>(
    frames_count:   usize,
    references:     &[P],
    policy:         ReplacementPolicy,
) -> Result<PagingOutcome<P>, SimError>
where P: Clone + Eq + Hash {
    check_frames(frames_count)?;
    debug!(%policy, frames_count, references = references.len(), "Page replacement started");

    let mut frames: Vec<Option<P>> = vec![None; frames_count];
    // Resident page -> frame index. Kept in load order for FIFO and in
    // recency order (least recent first) for LRU.
    let mut resident: IndexMap<P, usize> = IndexMap::with_capacity(frames_count);
    let mut history = Vec::with_capacity(references.len());
    let mut fault_count = 0;

    for (now, page) in references.iter().enumerate() {
        let is_fault = if resident.contains_key(page) {
            if let ReplacementPolicy::Lru = policy {
                if let Some((_, p, slot)) = resident.shift_remove_full(page) {
                    resident.insert(p, slot);
                }
            }
            false
        } else {
            let slot = match frames.iter().position(Option::is_none) {
                Some(empty) => empty,
                None        => match policy {
                    ReplacementPolicy::Fifo | ReplacementPolicy::Lru    => resident[0],
                    ReplacementPolicy::Optimal  => farthest_next_use(&frames, &references[now + 1..]),
                },
            };
            if let Some(victim) = frames[slot].replace(page.clone()) {
                resident.shift_remove(&victim);
            }
            resident.insert(page.clone(), slot);
            fault_count += 1;
            trace!(step = now, slot, "page fault");
            true
        };
        history.push(HistoryStep {
            frames: frames.clone(),
            is_fault,
        });
    }
    debug!(%policy, fault_count, "Page replacement finished");

    Ok(PagingOutcome {
        policy,
        history,
        fault_count,
    })
}

/// Frame index of the page whose next use in `future` is farthest away.
/// The first page that is never used again is picked outright; among
/// equally distant pages the lowest frame index wins.
fn farthest_next_use<P: PartialEq>(frames: &[Option<P>], future: &[P]) -> usize {
    let mut victim = 0;
    let mut farthest: Option<usize> = None;
    for (slot, page) in frames.iter().enumerate() {
        match future.iter().position(|p| Some(p) == page.as_ref()) {
            None        => { return slot; },
            Some(dist)  => {
                if farthest.map_or(true, |f| dist > f) {
                    farthest = Some(dist);
                    victim = slot;
                }
            }
        }
    }

    victim
}

#[cfg(test)]
mod tests {
    use super::*;

    const BELADY: [u32; 12] = [1, 2, 3, 4, 1, 2, 5, 1, 2, 3, 4, 5];

    fn faults(frames: usize, refs: &[u32], policy: ReplacementPolicy) -> usize {
        run_page_replacement(frames, refs, policy).unwrap().fault_count
    }

    #[test]
    fn fifo_on_a_short_stream() {
        // Every reference after the warm-up evicts the page needed next.
        assert_eq!(faults(3, &[1, 2, 3, 4, 1, 2, 5], ReplacementPolicy::Fifo), 7);
    }

    #[test]
    fn textbook_fault_counts() {
        assert_eq!(faults(3, &BELADY, ReplacementPolicy::Fifo), 9);
        assert_eq!(faults(3, &BELADY, ReplacementPolicy::Lru), 10);
        assert_eq!(faults(3, &BELADY, ReplacementPolicy::Optimal), 7);
    }

    #[test]
    fn fifo_shows_beladys_anomaly() {
        assert_eq!(faults(4, &BELADY, ReplacementPolicy::Fifo), 10);
    }

    #[test]
    fn lru_refreshes_on_hit_without_moving_frames() {
        let out = run_page_replacement(2, &[1, 2, 1, 3], ReplacementPolicy::Lru).unwrap();
        assert_eq!(out.history[2].frames, vec![Some(1), Some(2)]);
        assert!(!out.history[2].is_fault);
        assert_eq!(out.history[3].frames, vec![Some(1), Some(3)]);

        let out = run_page_replacement(2, &[1, 2, 1, 3], ReplacementPolicy::Fifo).unwrap();
        assert_eq!(out.history[3].frames, vec![Some(3), Some(2)]);
    }

    #[test]
    fn optimal_evicts_unused_pages_first_frame_first() {
        let out = run_page_replacement(2, &[1, 2, 3], ReplacementPolicy::Optimal).unwrap();
        assert_eq!(out.history[2].frames, vec![Some(3), Some(2)]);

        let out = run_page_replacement(3, &[7, 8, 9, 1, 9, 8], ReplacementPolicy::Optimal).unwrap();
        assert_eq!(out.history[3].frames, vec![Some(1), Some(8), Some(9)]);
    }

    #[test]
    fn spare_frames_only_fault_on_first_touch() {
        let out = run_page_replacement(5, &[1, 2, 1, 2], ReplacementPolicy::Lru).unwrap();
        assert_eq!(out.fault_count, 2);
        assert_eq!(out.hit_count(), 2);
        assert_eq!(out.history[3].frames, vec![Some(1), Some(2), None, None, None]);
        assert_eq!(out.hit_ratio(), 0.5);
    }

    #[test]
    fn string_pages_work_too() {
        let refs: Vec<String> = parse_list("a, b, a, c").unwrap();
        let out = run_page_replacement(2, &refs, ReplacementPolicy::Fifo).unwrap();
        assert_eq!(out.fault_count, 3);
        assert_eq!(out.history[3].frames, vec![Some("c".to_string()), Some("b".to_string())]);
    }

    #[test]
    fn empty_stream_and_zero_frames() {
        let out = run_page_replacement::<u32>(3, &[], ReplacementPolicy::Optimal).unwrap();
        assert!(out.history.is_empty());
        assert_eq!(out.fault_count, 0);
        assert_eq!(out.hit_ratio(), 0.0);
        assert!(matches!(run_page_replacement(0, &[1], ReplacementPolicy::Fifo), Err(SimError::ZeroFrames)));
    }
}
