use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct Config {
    pub bind: String,
    pub port: u16,
    pub loglevel: String,
    // Persistence
    pub dir: String,
    pub appendfilename: String,
    pub appendonly: bool,
    pub appendfsync: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            bind: "127.0.0.1".to_string(),
            port: 6379,
            loglevel: "info".to_string(),
            dir: ".".to_string(),
            appendfilename: "aof".to_string(),
            appendonly: true,
            appendfsync: "everysec".to_string(),
        }
    }
}

impl Config {
    pub fn from_args(args: &[String]) -> Self {
        let mut config = Config::default();
        let mut i = 0;
        while i < args.len() {
            match args[i].as_str() {
                "--port" => {
                    if i + 1 < args.len() {
                        if let Ok(p) = args[i + 1].parse() {
                            config.port = p;
                        }
                        i += 1;
                    }
                }
                "--bind" => {
                    if i + 1 < args.len() {
                        config.bind = args[i + 1].clone();
                        i += 1;
                    }
                }
                "--dir" => {
                    if i + 1 < args.len() {
                        config.dir = args[i + 1].clone();
                        i += 1;
                    }
                }
                "--appendfilename" => {
                    if i + 1 < args.len() {
                        config.appendfilename = args[i + 1].clone();
                        i += 1;
                    }
                }
                "--appendonly" => {
                    if i + 1 < args.len() {
                        config.appendonly = args[i + 1] == "yes";
                        i += 1;
                    }
                }
                "--appendfsync" => {
                    if i + 1 < args.len() {
                        config.appendfsync = args[i + 1].clone();
                        i += 1;
                    }
                }
                "--loglevel" => {
                    if i + 1 < args.len() {
                        config.loglevel = args[i + 1].clone();
                        i += 1;
                    }
                }
                _ => {}
            }
            i += 1;
        }
        config
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.bind, self.port)
    }

    pub fn aof_path(&self) -> PathBuf {
        PathBuf::from(&self.dir).join(&self.appendfilename)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_args(&[]);
        assert_eq!(config.addr(), "127.0.0.1:6379");
        assert!(config.appendonly);
        assert_eq!(config.aof_path(), PathBuf::from("./aof"));
    }

    #[test]
    fn test_from_args() {
        let config = Config::from_args(&args(&[
            "--port",
            "7000",
            "--dir",
            "/tmp/kv",
            "--appendfilename",
            "log.aof",
            "--appendonly",
            "no",
            "--appendfsync",
            "always",
        ]));
        assert_eq!(config.port, 7000);
        assert!(!config.appendonly);
        assert_eq!(config.appendfsync, "always");
        assert_eq!(config.aof_path(), PathBuf::from("/tmp/kv/log.aof"));
    }

    #[test]
    fn test_bad_port_keeps_default() {
        let config = Config::from_args(&args(&["--port", "nope", "--bind", "0.0.0.0"]));
        assert_eq!(config.port, 6379);
        assert_eq!(config.bind, "0.0.0.0");
    }

    #[test]
    fn test_trailing_flag_without_value() {
        let config = Config::from_args(&args(&["--loglevel"]));
        assert_eq!(config.loglevel, "info");
    }
}
