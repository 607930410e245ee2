// Physical device ranking
//
// Devices are ordered best-first by two stable partitions:
// 1. Discrete GPUs before everything else
// 2. Within each of those groups, devices that support extended formats for
//    storage images (R8_UINT, R8_UNORM and friends) first
//
// Devices that tie on both criteria keep the order the driver reported them in.

use super::ContextError;

/// What the ranking needs to know about a device
pub trait Rankable {
    fn name(&self) -> &str;
    fn is_discrete(&self) -> bool;
    fn supports_extended_storage_formats(&self) -> bool;
}

/// Move every item matching `pred` in front of the rest, keeping relative order.
/// Returns the number of matching items.
fn stable_partition<T>(items: Vec<T>, pred: impl Fn(&T) -> bool) -> (Vec<T>, usize) {
    let (mut front, back): (Vec<T>, Vec<T>) = items.into_iter().partition(|item| pred(item));
    let pivot = front.len();
    front.extend(back);
    (front, pivot)
}

/// Sort devices from best to worst
pub fn rank_devices<T: Rankable>(devices: Vec<T>) -> Vec<T> {
    let (mut ranked, pivot) = stable_partition(devices, T::is_discrete);

    let others = ranked.split_off(pivot);
    let (mut ranked, _) = stable_partition(ranked, T::supports_extended_storage_formats);
    let (others, _) = stable_partition(others, T::supports_extended_storage_formats);

    ranked.extend(others);
    ranked
}

/// Pick the device to create a context on.
///
/// `preferred` is matched case-insensitively against device names and wins
/// over the ranking when it matches. An empty device list is an error.
pub fn select_device<T: Rankable>(devices: Vec<T>, preferred: Option<&str>) -> Result<T, ContextError> {
    let mut ranked = rank_devices(devices);

    if let Some(preferred) = preferred.filter(|p| !p.is_empty()) {
        let wanted = preferred.to_lowercase();
        if let Some(index) = ranked
            .iter()
            .position(|d| d.name().to_lowercase().contains(&wanted))
        {
            log::info!("Using preferred GPU '{}'", ranked[index].name());
            return Ok(ranked.swap_remove(index));
        }
        log::warn!("Preferred GPU '{}' not found, falling back to automatic selection", preferred);
    }

    if ranked.is_empty() {
        return Err(ContextError::NoSuitableDevice);
    }
    Ok(ranked.swap_remove(0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Debug, Clone, PartialEq)]
    struct Fake {
        name: &'static str,
        discrete: bool,
        extended: bool,
    }

    fn fake(name: &'static str, discrete: bool, extended: bool) -> Fake {
        Fake { name, discrete, extended }
    }

    impl Rankable for Fake {
        fn name(&self) -> &str {
            self.name
        }
        fn is_discrete(&self) -> bool {
            self.discrete
        }
        fn supports_extended_storage_formats(&self) -> bool {
            self.extended
        }
    }

    fn names(devices: &[Fake]) -> Vec<&'static str> {
        devices.iter().map(|d| d.name).collect()
    }

    #[test]
    fn ranks_discrete_then_extended() {
        let devices = vec![
            fake("A", false, false),
            fake("B", true, false),
            fake("C", true, true),
            fake("D", false, true),
        ];
        assert_eq!(names(&rank_devices(devices)), ["C", "B", "D", "A"]);
    }

    #[test]
    fn ties_keep_enumeration_order() {
        let devices = vec![
            fake("int0", false, true),
            fake("disc0", true, true),
            fake("int1", false, true),
            fake("disc1", true, true),
            fake("disc2", true, false),
            fake("int2", false, false),
        ];
        assert_eq!(
            names(&rank_devices(devices)),
            ["disc0", "disc1", "disc2", "int0", "int1", "int2"]
        );
    }

    #[test]
    fn ordering_holds_for_every_small_input() {
        // Every list of up to four devices drawn from the four kinds
        let kinds = [(false, false), (false, true), (true, false), (true, true)];
        for len in 0..=4u32 {
            for code in 0..4usize.pow(len) {
                let mut c = code;
                let input: Vec<(usize, bool, bool)> = (0..len as usize)
                    .map(|i| {
                        let (d, e) = kinds[c % 4];
                        c /= 4;
                        (i, d, e)
                    })
                    .collect();
                let devices: Vec<Fake> = input
                    .iter()
                    .map(|&(_, d, e)| fake("x", d, e))
                    .collect();

                let ranked = rank_devices(devices);
                let mut expected = input.clone();
                expected.sort_by_key(|&(i, d, e)| (!d, !e, i));

                let got: Vec<(bool, bool)> = ranked.iter().map(|f| (f.discrete, f.extended)).collect();
                let want: Vec<(bool, bool)> = expected.iter().map(|&(_, d, e)| (d, e)).collect();
                assert_eq!(got, want, "input {:?}", input);
            }
        }
    }

    #[test]
    fn empty_list_is_an_error() {
        let result = select_device(Vec::<Fake>::new(), None);
        assert!(matches!(result, Err(ContextError::NoSuitableDevice)));

        let result = select_device(Vec::<Fake>::new(), Some("nvidia"));
        assert!(matches!(result, Err(ContextError::NoSuitableDevice)));
    }

    #[test]
    fn selects_ranked_head() {
        let devices = vec![fake("llvmpipe", false, true), fake("GeForce", true, false)];
        assert_eq!(select_device(devices, None).unwrap().name, "GeForce");
    }

    #[test]
    fn preferred_name_overrides_ranking() {
        let devices = vec![fake("Intel UHD 630", false, true), fake("GeForce RTX", true, true)];
        let picked = select_device(devices, Some("intel uhd")).unwrap();
        assert_eq!(picked.name, "Intel UHD 630");
    }

    #[test]
    fn unmatched_preference_falls_back() {
        let devices = vec![fake("Intel UHD 630", false, true), fake("GeForce RTX", true, true)];
        let picked = select_device(devices.clone(), Some("radeon")).unwrap();
        assert_eq!(picked.name, "GeForce RTX");

        let picked = select_device(devices, Some("")).unwrap();
        assert_eq!(picked.name, "GeForce RTX");
    }

    /// Collects warnings so tests can check what was logged
    struct Capture(Mutex<Vec<String>>);

    impl log::Log for Capture {
        fn enabled(&self, metadata: &log::Metadata) -> bool {
            metadata.level() <= log::Level::Warn
        }
        fn log(&self, record: &log::Record) {
            if self.enabled(record.metadata()) {
                if let Ok(mut lines) = self.0.lock() {
                    lines.push(record.args().to_string());
                }
            }
        }
        fn flush(&self) {}
    }

    static CAPTURE: Capture = Capture(Mutex::new(Vec::new()));

    #[test]
    fn fallback_warning_names_the_configured_gpu() {
        if log::set_logger(&CAPTURE).is_ok() {
            log::set_max_level(log::LevelFilter::Warn);
        }

        let devices = vec![fake("GeForce RTX", true, true)];
        select_device(devices, Some("Radeon RX")).unwrap();

        let lines = CAPTURE.0.lock().unwrap();
        assert!(
            lines.iter().any(|l| l.contains("'Radeon RX' not found")),
            "{:?}",
            *lines
        );
    }
}
