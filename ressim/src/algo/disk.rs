use crate::helpe::*;

/// The cylinders the head stops at, starting where it was parked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HeadPath {
    pub algorithm:  DiskAlgorithm,
    pub path:       Vec<Ticks>,
    /// Total cylinders traveled.
    pub seek_cost:  Ticks,
    /// Requests served. Boundary stops on the way are not requests.
    pub serviced:   usize,
}

impl HeadPath {
    /// Number of head movements, boundary stops included.
    pub fn movements(&self) -> usize {
        self.path.len().saturating_sub(1)
    }

    pub fn avg_seek(&self) -> f64 {
        if self.serviced == 0 {
            0.0
        } else { self.seek_cost as f64 / self.serviced as f64 }
    }
}

impl fmt::Display for HeadPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Algorithm:\t{}", self.algorithm)?;
        writeln!(f, "Path:\t{}", self.path.iter().join(" -> "))?;
        write!(
            f,
            "Seek cost:\t{} cylinders\nAvg. seek:\t{:.2}",
            self.seek_cost,
            self.avg_seek(),
        )
    }
}

/// Moves the head from `initial` through every cylinder in `requests`.
///
/// SCAN and C-SCAN always sweep upward first. When requests remain below
/// the starting point, the sweep runs on to the last cylinder (an
/// explicit stop, even without a request there) before turning around
/// (SCAN) or wrapping to cylinder 0 (C-SCAN).
pub fn run_disk_schedule(
    initial:        Ticks,
    requests:       &[Ticks],
    max_cylinders:  Ticks,
    algorithm:      DiskAlgorithm,
) -> Result<HeadPath, SimError> {
    check_disk(initial, requests, max_cylinders)?;
    debug!(%algorithm, initial, requests = requests.len(), max_cylinders, "Disk scheduling started");

    let mut path = Vec::with_capacity(requests.len() + 3);
    path.push(initial);
    match algorithm {
        DiskAlgorithm::Fcfs => { path.extend_from_slice(requests); },
        DiskAlgorithm::Scan | DiskAlgorithm::CScan => {
            let sorted = requests.iter()
                .copied()
                .sorted_unstable()
                .collect_vec();
            let (below, above) = sorted.split_at(sorted.partition_point(|&c| c < initial));
            path.extend_from_slice(above);
            if !below.is_empty() {
                path.push(max_cylinders - 1);
                if let DiskAlgorithm::Scan = algorithm {
                    path.extend(below.iter().rev());
                } else {
                    path.push(0);
                    path.extend_from_slice(below);
                }
            }
        },
    }
    let seek_cost = path_cost(&path);
    debug!(%algorithm, seek_cost, "Disk scheduling finished");

    Ok(HeadPath {
        algorithm,
        path,
        seek_cost,
        serviced: requests.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const QUEUE: [Ticks; 7] = [82, 170, 43, 140, 24, 16, 190];

    #[test]
    fn fcfs_follows_input_order() {
        let hp = run_disk_schedule(50, &QUEUE, 200, DiskAlgorithm::Fcfs).unwrap();
        assert_eq!(hp.path, vec![50, 82, 170, 43, 140, 24, 16, 190]);
        assert_eq!(hp.seek_cost, 642);
    }

    #[test]
    fn scan_stops_at_the_last_cylinder_before_turning() {
        let hp = run_disk_schedule(50, &QUEUE, 200, DiskAlgorithm::Scan).unwrap();
        assert_eq!(hp.path, vec![50, 82, 140, 170, 190, 199, 43, 24, 16]);
        assert_eq!(hp.seek_cost, (199 - 50) + (199 - 16));
        assert_eq!(hp.movements(), 8);
    }

    #[test]
    fn c_scan_wraps_to_zero() {
        let hp = run_disk_schedule(50, &QUEUE, 200, DiskAlgorithm::CScan).unwrap();
        assert_eq!(hp.path, vec![50, 82, 140, 170, 190, 199, 0, 16, 24, 43]);
        assert_eq!(hp.seek_cost, 149 + 199 + 43);
    }

    #[test]
    fn no_turn_without_lower_requests() {
        for algo in [DiskAlgorithm::Scan, DiskAlgorithm::CScan] {
            let hp = run_disk_schedule(50, &[70, 60, 50], 200, algo).unwrap();
            assert_eq!(hp.path, vec![50, 50, 60, 70]);
            assert_eq!(hp.seek_cost, 20);
        }
    }

    #[test]
    fn only_lower_requests_still_sweep_up_first() {
        let hp = run_disk_schedule(10, &[5, 2], 20, DiskAlgorithm::Scan).unwrap();
        assert_eq!(hp.path, vec![10, 19, 5, 2]);
        assert_eq!(hp.seek_cost, 9 + 17);
    }

    #[test]
    fn empty_queue_stays_put() {
        for algo in DiskAlgorithm::ALL {
            let hp = run_disk_schedule(42, &[], 100, algo).unwrap();
            assert_eq!(hp.path, vec![42]);
            assert_eq!(hp.seek_cost, 0);
            assert_eq!(hp.avg_seek(), 0.0);
        }
    }

    #[test]
    fn out_of_range_input_is_rejected() {
        assert!(matches!(
            run_disk_schedule(200, &[1], 200, DiskAlgorithm::Scan),
            Err(SimError::HeadOutOfRange { head: 200, max: 200 })
        ));
        assert!(matches!(
            run_disk_schedule(0, &[1, 250], 200, DiskAlgorithm::Fcfs),
            Err(SimError::CylinderOutOfRange { cylinder: 250, .. })
        ));
    }
}
