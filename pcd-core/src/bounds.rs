use std::{fmt, str::FromStr};

/// Axis-aligned rectangle in the planar CRS of a tile.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min_x: f64,
    pub max_x: f64,
    pub min_y: f64,
    pub max_y: f64,
}

impl Bounds {
    pub fn new(min_x: f64, max_x: f64, min_y: f64, max_y: f64) -> Self {
        Self {
            min_x,
            max_x,
            min_y,
            max_y,
        }
    }

    /// Edge-inclusive.
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.min_x && x <= self.max_x && y >= self.min_y && y <= self.max_y
    }

    pub fn strictly_contains(&self, x: f64, y: f64) -> bool {
        x > self.min_x && x < self.max_x && y > self.min_y && y < self.max_y
    }
}

impl fmt::Display for Bounds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{},{},{},{}",
            self.min_x, self.max_x, self.min_y, self.max_y
        )
    }
}

/// Parses `xmin,xmax,ymin,ymax`.
impl FromStr for Bounds {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let values = s
            .split(',')
            .map(|v| {
                v.trim()
                    .parse::<f64>()
                    .map_err(|e| format!("Failed to parse bound '{}': {}", v, e))
            })
            .collect::<Result<Vec<f64>, String>>()?;

        if values.len() != 4 {
            return Err(format!(
                "Expected 4 comma separated values (xmin,xmax,ymin,ymax), got {}",
                values.len()
            ));
        }
        if values.iter().any(|v| !v.is_finite()) {
            return Err("Bounds must be finite".to_string());
        }
        if values[0] > values[1] || values[2] > values[3] {
            return Err(format!("Bounds are inverted: {}", s));
        }

        Ok(Bounds::new(values[0], values[1], values[2], values[3]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_bounds() {
        let b: Bounds = "996300, 997000,238600,239400".parse().unwrap();
        assert_eq!(b, Bounds::new(996300.0, 997000.0, 238600.0, 239400.0));
        assert!(b.contains(996300.0, 239400.0));
        assert!(!b.strictly_contains(996300.0, 239000.0));
    }

    #[test]
    fn reject_malformed_bounds() {
        assert!("1,2,3".parse::<Bounds>().is_err());
        assert!("1,2,x,4".parse::<Bounds>().is_err());
        assert!("5,2,3,4".parse::<Bounds>().is_err());
    }
}
