//! Deterministic sorting-step generation for the visualization frame.
//!
//! Given an algorithm token and a comma-separated integer string, produces
//! an ordered, replayable sequence of animation frames. Each frame tags the
//! indices currently being compared or swapped and the indices known to be
//! in final position; the last frame always marks the whole array sorted.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from the step generator.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VizError {
    /// The array payload held no valid integers. A normal negative
    /// outcome rendered as a warning, not a system error.
    #[error("No valid array data found")]
    NoData,
}

/// One animation frame of a sort replay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortStep {
    /// Array contents after the action this frame describes.
    pub array: Vec<i32>,
    /// Indices being compared in this frame.
    #[serde(default)]
    pub comparing: Vec<usize>,
    /// Indices being swapped in this frame.
    #[serde(default)]
    pub swapping: Vec<usize>,
    /// Indices in their final sorted position.
    #[serde(default)]
    pub sorted: Vec<usize>,
}

impl SortStep {
    fn comparing(array: &[i32], a: usize, b: usize) -> Self {
        Self {
            array: array.to_vec(),
            comparing: vec![a, b],
            swapping: Vec::new(),
            sorted: Vec::new(),
        }
    }

    fn swapping(array: &[i32], a: usize, b: usize) -> Self {
        Self {
            array: array.to_vec(),
            comparing: Vec::new(),
            swapping: vec![a, b],
            sorted: Vec::new(),
        }
    }

    fn finished(array: &[i32]) -> Self {
        Self {
            array: array.to_vec(),
            comparing: Vec::new(),
            swapping: Vec::new(),
            sorted: (0..array.len()).collect(),
        }
    }
}

/// Sorting algorithms with dedicated step generators.
///
/// The rarer algorithms in the detection set reuse the selection-sort
/// generator; an unrecognized token falls back to bubble sort.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Algorithm {
    Bubble,
    Insertion,
    Selection,
    Quick,
    Merge,
    Heap,
    Counting,
    Radix,
    Bucket,
}

impl Algorithm {
    /// Resolves a detection token. Unknown tokens (including "default")
    /// fall back to `Bubble`.
    pub fn from_token(token: &str) -> Self {
        match token {
            "bubble" => Self::Bubble,
            "insertion" => Self::Insertion,
            "selection" => Self::Selection,
            "quick" => Self::Quick,
            "merge" => Self::Merge,
            "heap" => Self::Heap,
            "counting" => Self::Counting,
            "radix" => Self::Radix,
            "bucket" => Self::Bucket,
            _ => Self::Bubble,
        }
    }

    /// Human-readable name shown above the replay.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Bubble => "Bubble Sort",
            Self::Insertion => "Insertion Sort",
            Self::Selection => "Selection Sort",
            Self::Quick => "Quick Sort",
            Self::Merge => "Merge Sort",
            Self::Heap => "Heap Sort",
            Self::Counting => "Counting Sort",
            Self::Radix => "Radix Sort",
            Self::Bucket => "Bucket Sort",
        }
    }
}

/// A complete replay: algorithm name plus ordered frames.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortRun {
    pub algorithm_name: String,
    pub steps: Vec<SortStep>,
}

/// Parses a comma-separated integer string, dropping anything that does
/// not parse as an integer.
pub fn parse_array(data: &str) -> Vec<i32> {
    data.split(',')
        .filter_map(|s| s.trim().parse::<i32>().ok())
        .collect()
}

/// Generates the replay for an algorithm token and a comma-separated
/// array payload.
pub fn generate(token: &str, array_data: &str) -> Result<SortRun, VizError> {
    let array = parse_array(array_data);
    if array.is_empty() {
        return Err(VizError::NoData);
    }
    let algorithm = Algorithm::from_token(token);
    let steps = match algorithm {
        Algorithm::Bubble => bubble_steps(&array),
        Algorithm::Insertion => insertion_steps(&array),
        Algorithm::Selection
        | Algorithm::Heap
        | Algorithm::Counting
        | Algorithm::Radix
        | Algorithm::Bucket => selection_steps(&array),
        Algorithm::Quick => quick_steps(&array),
        Algorithm::Merge => merge_steps(&array),
    };
    Ok(SortRun {
        algorithm_name: algorithm.display_name().to_string(),
        steps,
    })
}

fn bubble_steps(input: &[i32]) -> Vec<SortStep> {
    let mut arr = input.to_vec();
    let mut steps = Vec::new();
    for i in 0..arr.len() {
        for j in 0..arr.len().saturating_sub(i + 1) {
            steps.push(SortStep::comparing(&arr, j, j + 1));
            if arr[j] > arr[j + 1] {
                arr.swap(j, j + 1);
                steps.push(SortStep::swapping(&arr, j, j + 1));
            }
        }
    }
    steps.push(SortStep::finished(&arr));
    steps
}

fn insertion_steps(input: &[i32]) -> Vec<SortStep> {
    let mut arr = input.to_vec();
    let mut steps = Vec::new();
    for i in 1..arr.len() {
        let key = arr[i];
        let mut j = i;
        steps.push(SortStep::comparing(&arr, i, i - 1));
        while j > 0 && arr[j - 1] > key {
            arr[j] = arr[j - 1];
            j -= 1;
            steps.push(SortStep::swapping(&arr, j, j + 1));
        }
        arr[j] = key;
    }
    steps.push(SortStep::finished(&arr));
    steps
}

fn selection_steps(input: &[i32]) -> Vec<SortStep> {
    let mut arr = input.to_vec();
    let mut steps = Vec::new();
    for i in 0..arr.len().saturating_sub(1) {
        let mut min_idx = i;
        for j in (i + 1)..arr.len() {
            steps.push(SortStep::comparing(&arr, min_idx, j));
            if arr[j] < arr[min_idx] {
                min_idx = j;
            }
        }
        if min_idx != i {
            arr.swap(i, min_idx);
            steps.push(SortStep::swapping(&arr, i, min_idx));
        }
    }
    steps.push(SortStep::finished(&arr));
    steps
}

fn quick_steps(input: &[i32]) -> Vec<SortStep> {
    fn partition(arr: &mut Vec<i32>, low: usize, high: usize, steps: &mut Vec<SortStep>) -> usize {
        let pivot = arr[high];
        let mut i = low;
        for j in low..high {
            steps.push(SortStep::comparing(arr, j, high));
            if arr[j] < pivot {
                arr.swap(i, j);
                steps.push(SortStep::swapping(arr, i, j));
                i += 1;
            }
        }
        arr.swap(i, high);
        steps.push(SortStep::swapping(arr, i, high));
        i
    }

    fn sort(arr: &mut Vec<i32>, low: usize, high: usize, steps: &mut Vec<SortStep>) {
        if low < high {
            let p = partition(arr, low, high, steps);
            if p > 0 {
                sort(arr, low, p - 1, steps);
            }
            sort(arr, p + 1, high, steps);
        }
    }

    let mut arr = input.to_vec();
    let mut steps = Vec::new();
    let len = arr.len();
    sort(&mut arr, 0, len - 1, &mut steps);
    steps.push(SortStep::finished(&arr));
    steps
}

fn merge_steps(input: &[i32]) -> Vec<SortStep> {
    fn merge(arr: &mut Vec<i32>, left: usize, mid: usize, right: usize, steps: &mut Vec<SortStep>) {
        let left_arr: Vec<i32> = arr[left..=mid].to_vec();
        let right_arr: Vec<i32> = arr[mid + 1..=right].to_vec();
        let (mut i, mut j, mut k) = (0, 0, left);
        while i < left_arr.len() && j < right_arr.len() {
            steps.push(SortStep::comparing(arr, left + i, mid + 1 + j));
            if left_arr[i] <= right_arr[j] {
                arr[k] = left_arr[i];
                i += 1;
            } else {
                arr[k] = right_arr[j];
                j += 1;
            }
            k += 1;
        }
        while i < left_arr.len() {
            arr[k] = left_arr[i];
            i += 1;
            k += 1;
        }
        while j < right_arr.len() {
            arr[k] = right_arr[j];
            j += 1;
            k += 1;
        }
        steps.push(SortStep {
            array: arr.clone(),
            comparing: Vec::new(),
            swapping: Vec::new(),
            sorted: Vec::new(),
        });
    }

    fn sort(arr: &mut Vec<i32>, left: usize, right: usize, steps: &mut Vec<SortStep>) {
        if left < right {
            let mid = left + (right - left) / 2;
            sort(arr, left, mid, steps);
            sort(arr, mid + 1, right, steps);
            merge(arr, left, mid, right, steps);
        }
    }

    let mut arr = input.to_vec();
    let mut steps = Vec::new();
    let len = arr.len();
    sort(&mut arr, 0, len - 1, &mut steps);
    steps.push(SortStep::finished(&arr));
    steps
}

#[cfg(test)]
mod tests {
    use super::*;

    fn final_array(run: &SortRun) -> &[i32] {
        &run.steps.last().unwrap().array
    }

    #[test]
    fn test_parse_array_filters_garbage() {
        assert_eq!(parse_array("5, 3, x, 8, , 1"), vec![5, 3, 8, 1]);
        assert_eq!(parse_array(""), Vec::<i32>::new());
        assert_eq!(parse_array("not an array"), Vec::<i32>::new());
    }

    #[test]
    fn test_empty_payload_is_no_data() {
        assert_eq!(generate("bubble", "a, b, c"), Err(VizError::NoData));
    }

    #[test]
    fn test_all_generators_end_fully_sorted() {
        let tokens = [
            "bubble",
            "insertion",
            "selection",
            "quick",
            "merge",
            "heap",
            "counting",
            "radix",
            "bucket",
        ];
        for token in tokens {
            let run = generate(token, "5, 1, 4, 2, 8, 3").unwrap();
            let last = run.steps.last().unwrap();
            assert_eq!(final_array(&run), &[1, 2, 3, 4, 5, 8], "{token}");
            assert_eq!(last.sorted, (0..6).collect::<Vec<_>>(), "{token}");
        }
    }

    #[test]
    fn test_unknown_token_falls_back_to_bubble() {
        let run = generate("default", "2, 1").unwrap();
        assert_eq!(run.algorithm_name, "Bubble Sort");
        assert_eq!(final_array(&run), &[1, 2]);
    }

    #[test]
    fn test_replay_is_deterministic() {
        let a = generate("quick", "9, 7, 5, 3, 1").unwrap();
        let b = generate("quick", "9, 7, 5, 3, 1").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_single_element_run() {
        let run = generate("merge", "42").unwrap();
        assert_eq!(final_array(&run), &[42]);
        assert_eq!(run.steps.last().unwrap().sorted, vec![0]);
    }

    #[test]
    fn test_bubble_frames_tag_indices() {
        let run = generate("bubble", "2, 1").unwrap();
        assert_eq!(run.steps[0].comparing, vec![0, 1]);
        assert_eq!(run.steps[1].swapping, vec![0, 1]);
        assert_eq!(run.steps[1].array, vec![1, 2]);
    }
}
