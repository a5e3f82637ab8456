use regex::Regex;
use std::path::Path;
use tracing::error;

/// Checks if a string is a well-formed EVM address (`0x` + 40 hex digits).
pub fn is_valid_evm_address(address: &str) -> bool {
    Regex::new(r"^0x[0-9a-fA-F]{40}$")
        .map(|re| re.is_match(address))
        .unwrap_or(false)
}

/// Reads wallet addresses from a TXT or CSV file.
///
/// CSV files contribute every cell that looks like an address; TXT files
/// are one address per line, with a whitespace-split fallback for lines
/// that carry extra text. Read failures log and return an empty list.
pub fn read_addresses_from_file(path: &Path) -> Vec<String> {
    let mut addresses = Vec::new();

    let is_csv = path
        .extension()
        .map_or(false, |ext| ext.eq_ignore_ascii_case("csv"));

    if is_csv {
        let mut reader = match csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_path(path)
        {
            Ok(reader) => reader,
            Err(e) => {
                error!("Error reading address file {}: {}", path.display(), e);
                return addresses;
            }
        };

        for record in reader.records() {
            match record {
                Ok(row) => {
                    for cell in row.iter() {
                        let cell = cell.trim();
                        if is_valid_evm_address(cell) {
                            addresses.push(cell.to_string());
                        }
                    }
                }
                Err(e) => error!("Error reading address file {}: {}", path.display(), e),
            }
        }
    } else {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                error!("Error reading address file {}: {}", path.display(), e);
                return addresses;
            }
        };

        for line in content.lines() {
            let line = line.trim();
            if is_valid_evm_address(line) {
                addresses.push(line.to_string());
            } else if !line.is_empty() {
                // Loose fallback for lines carrying more than an address
                for part in line.split_whitespace() {
                    if is_valid_evm_address(part) {
                        addresses.push(part.to_string());
                    }
                }
            }
        }
    }

    addresses
}

/// Lowercase, validate, deduplicate and sort a collected address list.
pub fn normalize_address_list(addresses: Vec<String>) -> Vec<String> {
    let mut unique: Vec<String> = addresses
        .iter()
        .filter(|addr| is_valid_evm_address(addr))
        .map(|addr| addr.to_lowercase())
        .collect();
    unique.sort();
    unique.dedup();
    unique
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const ADDR_A: &str = "0xAaaaAAaaAaAAaaaAAAAAaaaAAaaaAAaAaaAaaaA1";
    const ADDR_B: &str = "0xbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb2";

    #[test]
    fn test_address_validation() {
        assert!(is_valid_evm_address(
            "0x1234567890123456789012345678901234567890"
        ));
        assert!(is_valid_evm_address(ADDR_A));
        assert!(!is_valid_evm_address("1234567890123456789012345678901234567890"));
        assert!(!is_valid_evm_address("0x12345"));
        assert!(!is_valid_evm_address(
            "0x123456789012345678901234567890123456789g"
        ));
        assert!(!is_valid_evm_address(""));
    }

    #[test]
    fn test_txt_file_with_loose_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wallets.txt");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "{}", ADDR_A).unwrap();
        writeln!(file, "# a comment line").unwrap();
        writeln!(file, "main wallet: {}", ADDR_B).unwrap();

        let addresses = read_addresses_from_file(&path);
        assert_eq!(addresses, vec![ADDR_A.to_string(), ADDR_B.to_string()]);
    }

    #[test]
    fn test_csv_file_scans_every_cell() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wallets.csv");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "name,address").unwrap();
        writeln!(file, "alice,{}", ADDR_A).unwrap();
        writeln!(file, "{},bob", ADDR_B).unwrap();

        let addresses = read_addresses_from_file(&path);
        assert_eq!(addresses, vec![ADDR_A.to_string(), ADDR_B.to_string()]);
    }

    #[test]
    fn test_missing_file_returns_empty() {
        let addresses = read_addresses_from_file(Path::new("/nonexistent/wallets.txt"));
        assert!(addresses.is_empty());
    }

    #[test]
    fn test_normalize_lowercases_dedups_and_sorts() {
        let normalized = normalize_address_list(vec![
            ADDR_B.to_string(),
            ADDR_A.to_string(),
            ADDR_A.to_lowercase(),
            "garbage".to_string(),
        ]);

        assert_eq!(
            normalized,
            vec![ADDR_A.to_lowercase(), ADDR_B.to_lowercase()]
        );
    }
}
