//! Labelled examples stored as row-aligned feature and label matrices.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::error::{Error, Result};
use crate::matrix::Mat;

use log::{debug, warn};
use rand::seq::SliceRandom;
use rand::Rng;

/// Class names of the iris dataset, in one-hot order.
pub const IRIS_CLASSES: [&str; 3] = ["setosa", "versicolor", "virginica"];

/// Number of feature columns in an iris CSV file.
const IRIS_FEATURES: usize = 4;

/// A set of labelled examples.
///
/// Row `i` of `features` is labelled by row `i` of `labels`. Every operation
/// that reorders rows applies the same permutation to both matrices.
#[derive(Clone, Debug, PartialEq)]
pub struct Dataset {
    features: Mat,
    labels: Mat,
}

impl Dataset {
    /// Pairs up a features matrix and a one-hot labels matrix.
    pub fn new(features: Mat, labels: Mat) -> Result<Self> {
        if features.rows() != labels.rows() {
            return Err(Error::RowMismatch {
                features: features.rows(),
                labels: labels.rows(),
            });
        }
        Ok(Dataset { features, labels })
    }

    /// Reads an iris-style CSV file. See `from_csv_reader`.
    pub fn from_csv_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        Dataset::from_csv_reader(File::open(path)?)
    }

    /// Reads iris-style CSV data.
    ///
    /// The first line is a header. Columns 0 to 3 hold the features and
    /// column 4 holds the class name, which is matched against
    /// `IRIS_CLASSES` after trimming and lowercasing. Rows with fewer than
    /// five columns are skipped. Rows with an unknown class are kept with an
    /// all-zero label.
    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut features = Vec::new();
        let mut labels = Vec::new();
        for record in reader.records() {
            let record = record?;
            let line = record.position().map_or(0, |p| p.line());
            if record.len() < IRIS_FEATURES + 1 {
                debug!("skipping line {} with {} columns", line, record.len());
                continue;
            }

            let mut row = [0.0f32; IRIS_FEATURES];
            for (value, field) in row.iter_mut().zip(record.iter()) {
                *value = field.parse().map_err(|_| Error::ParseFeature {
                    line,
                    value: field.to_owned(),
                })?;
            }

            let mut label = [0.0f32; 3];
            let name = record[IRIS_FEATURES].to_lowercase();
            match IRIS_CLASSES.iter().position(|&class| class == name) {
                Some(class) => label[class] = 1.0,
                None => warn!("unknown class {:?} on line {}", name, line),
            }

            features.push(row);
            labels.push(label);
        }

        if features.is_empty() {
            return Ok(Dataset {
                features: Mat::zeros(0, IRIS_FEATURES),
                labels: Mat::zeros(0, IRIS_CLASSES.len()),
            });
        }
        Dataset::new(Mat::from_rows(&features), Mat::from_rows(&labels))
    }

    /// Returns the number of examples.
    pub fn len(&self) -> usize {
        self.features.rows()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the number of features per example.
    pub fn input_len(&self) -> usize {
        self.features.cols()
    }

    /// Returns the width of each label.
    pub fn output_len(&self) -> usize {
        self.labels.cols()
    }

    pub fn features(&self) -> &Mat {
        &self.features
    }

    pub fn labels(&self) -> &Mat {
        &self.labels
    }

    /// Returns the `(features, label)` pair of example `i`.
    pub fn example(&self, i: usize) -> (&[f32], &[f32]) {
        (self.features.row(i), self.labels.row(i))
    }

    /// Shuffles the examples in place, keeping features and labels paired.
    pub fn shuffle<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<()> {
        shuffle_rows(&mut self.features, &mut self.labels, rng)
    }

    /// Randomly draws `num_train` and then `num_test` distinct examples.
    pub fn split<R>(
        &self,
        num_train: usize,
        num_test: usize,
        rng: &mut R,
    ) -> Result<(Dataset, Dataset)>
    where
        R: Rng + ?Sized,
    {
        let requested = num_train + num_test;
        if requested > self.len() {
            return Err(Error::SplitTooLarge {
                requested,
                available: self.len(),
            });
        }
        let mut indices: Vec<usize> = (0..self.len()).collect();
        indices.shuffle(rng);
        let (train, rest) = indices.split_at(num_train);
        Ok((self.select(train), self.select(&rest[..num_test])))
    }

    /// Divides every feature by `divisor`.
    ///
    /// # Panics
    ///
    /// Panics if `divisor` is not positive and finite.
    pub fn scale_features(&mut self, divisor: f32) {
        assert!(
            divisor.is_finite() && divisor > 0.0,
            "feature scale must be positive and finite"
        );
        self.features.map_inplace(|v| v / divisor);
    }

    fn select(&self, indices: &[usize]) -> Dataset {
        let mut features = Mat::zeros(indices.len(), self.input_len());
        let mut labels = Mat::zeros(indices.len(), self.output_len());
        for (dst, &src) in indices.iter().enumerate() {
            features.row_mut(dst).copy_from_slice(self.features.row(src));
            labels.row_mut(dst).copy_from_slice(self.labels.row(src));
        }
        Dataset { features, labels }
    }
}

/// Fisher-Yates shuffle applying the same row permutation to `features` and
/// `labels`.
pub fn shuffle_rows<R>(features: &mut Mat, labels: &mut Mat, rng: &mut R) -> Result<()>
where
    R: Rng + ?Sized,
{
    if features.rows() != labels.rows() {
        return Err(Error::RowMismatch {
            features: features.rows(),
            labels: labels.rows(),
        });
    }
    for i in (1..features.rows()).rev() {
        let j = rng.gen_range(0..=i);
        features.swap_rows(i, j);
        labels.swap_rows(i, j);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const IRIS: &str = "\
sepal_length,sepal_width,petal_length,petal_width,species
5.1,3.5,1.4,0.2,setosa
7.0,3.2,4.7,1.4, Versicolor
6.3,3.3,6.0,2.5,virginica
4.9,3.0
5.0,3.6,1.4,0.2,unknown
";

    /// Row `i` has features `[i, i, i]` and label `[i, -i]`.
    fn numbered(rows: usize) -> Dataset {
        let features: Vec<_> = (0..rows).map(|i| vec![i as f32; 3]).collect();
        let labels: Vec<_> = (0..rows).map(|i| vec![i as f32, -(i as f32)]).collect();
        Dataset::new(Mat::from_rows(&features), Mat::from_rows(&labels)).unwrap()
    }

    fn ids(dataset: &Dataset) -> Vec<usize> {
        (0..dataset.len())
            .map(|i| dataset.example(i).0[0] as usize)
            .collect()
    }

    #[test]
    fn rejects_misaligned_rows() {
        assert!(matches!(
            Dataset::new(Mat::zeros(3, 4), Mat::zeros(2, 3)),
            Err(Error::RowMismatch { features: 3, labels: 2 })
        ));
    }

    #[test]
    fn shuffle_is_a_paired_permutation() {
        let mut rng = StdRng::seed_from_u64(9);
        let mut dataset = numbered(50);
        dataset.shuffle(&mut rng).unwrap();

        let mut seen = ids(&dataset);
        assert_ne!(seen, (0..50).collect::<Vec<_>>());
        for i in 0..dataset.len() {
            let (x, y) = dataset.example(i);
            assert_eq!(x, &[x[0]; 3][..]);
            assert_eq!(y, &[x[0], -x[0]][..]);
        }
        seen.sort();
        assert_eq!(seen, (0..50).collect::<Vec<_>>());
    }

    #[test]
    fn shuffle_rows_rejects_mismatched_lengths() {
        let mut rng = StdRng::seed_from_u64(0);
        let mut features = Mat::zeros(3, 1);
        let mut labels = Mat::zeros(4, 1);
        assert!(matches!(
            shuffle_rows(&mut features, &mut labels, &mut rng),
            Err(Error::RowMismatch { .. })
        ));
    }

    #[test]
    fn shuffle_handles_tiny_datasets() {
        let mut rng = StdRng::seed_from_u64(0);
        let mut single = numbered(1);
        single.shuffle(&mut rng).unwrap();
        assert_eq!(single, numbered(1));
        let mut empty = Dataset::new(Mat::zeros(0, 3), Mat::zeros(0, 2)).unwrap();
        empty.shuffle(&mut rng).unwrap();
        assert!(empty.is_empty());
    }

    #[test]
    fn split_draws_disjoint_examples() {
        let mut rng = StdRng::seed_from_u64(4);
        let dataset = numbered(20);
        let (train, test) = dataset.split(12, 5, &mut rng).unwrap();
        assert_eq!(train.len(), 12);
        assert_eq!(test.len(), 5);

        let mut all = ids(&train);
        all.extend(ids(&test));
        all.sort();
        all.dedup();
        assert_eq!(all.len(), 17);
        for i in 0..test.len() {
            let (x, y) = test.example(i);
            assert_eq!(y, &[x[0], -x[0]][..]);
        }
    }

    #[test]
    fn split_too_large() {
        let mut rng = StdRng::seed_from_u64(4);
        assert!(matches!(
            numbered(10).split(8, 3, &mut rng),
            Err(Error::SplitTooLarge { requested: 11, available: 10 })
        ));
    }

    #[test]
    fn scale_features() {
        let mut dataset = numbered(3);
        dataset.scale_features(2.0);
        assert_eq!(dataset.example(2).0, &[1.0, 1.0, 1.0]);
        assert_eq!(dataset.example(2).1, &[2.0, -2.0]);
    }

    #[test]
    #[should_panic(expected = "feature scale must be positive")]
    fn scale_features_rejects_zero() {
        numbered(3).scale_features(0.0);
    }

    #[test]
    fn reads_iris_csv() {
        let dataset = Dataset::from_csv_reader(IRIS.as_bytes()).unwrap();
        assert_eq!(dataset.len(), 4);
        assert_eq!(dataset.input_len(), 4);
        assert_eq!(dataset.output_len(), 3);
        assert_eq!(dataset.example(0), (&[5.1, 3.5, 1.4, 0.2][..], &[1.0, 0.0, 0.0][..]));
        assert_eq!(dataset.example(1).1, &[0.0, 1.0, 0.0]);
        assert_eq!(dataset.example(2).1, &[0.0, 0.0, 1.0]);
        assert_eq!(dataset.example(3).1, &[0.0, 0.0, 0.0]);
    }

    #[test]
    fn rejects_non_numeric_features() {
        let csv = "a,b,c,d,species\n5.1,x,1.4,0.2,setosa\n";
        assert!(matches!(
            Dataset::from_csv_reader(csv.as_bytes()),
            Err(Error::ParseFeature { line: 2, .. })
        ));
    }

    #[test]
    fn header_only_csv_is_empty() {
        let dataset = Dataset::from_csv_reader("a,b,c,d,species\n".as_bytes()).unwrap();
        assert!(dataset.is_empty());
        assert_eq!(dataset.input_len(), 4);
    }
}
