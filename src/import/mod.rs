//! 数据导入模块
//!
//! 支持从 CSV、JSON Lines 导入边列表，以及从 JSON 读取分割请求

use crate::error::{Error, Result};
use crate::network::FlowNetwork;
use crate::segmentation::{GrayImage, PixelSeed};
use crate::types::{parse_capacity, Capacity, NodeId, INFINITE_CAPACITY};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;
use tracing::{debug, warn};

/// 导入统计
#[derive(Debug, Default, Clone, Serialize)]
pub struct ImportStats {
    pub nodes: usize,
    pub edges_imported: usize,
    pub errors: usize,
    pub duration_ms: u64,
}

/// 边记录
#[derive(Debug, Clone, Deserialize)]
struct EdgeRecord {
    from: NodeId,
    to: NodeId,
    capacity: CapacityValue,
}

/// CSV 边记录，容量按字符串读入后再解析
#[derive(Debug, Clone, Deserialize)]
struct CsvEdgeRecord {
    from: NodeId,
    to: NodeId,
    capacity: String,
}

/// 容量可写为整数或 `"inf"` 之类的字符串
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum CapacityValue {
    Number(Capacity),
    Text(String),
}

impl CapacityValue {
    fn resolve(&self) -> Result<Capacity> {
        match self {
            CapacityValue::Number(c) => Ok(*c),
            CapacityValue::Text(s) => parse_capacity(s),
        }
    }
}

/// 边列表导入器
///
/// 格式错误的行计入 `errors` 并跳过；负容量或越界节点使导入整体失败。
pub struct EdgeListImporter {
    source: NodeId,
    sink: NodeId,
    node_count: Option<usize>,
}

impl EdgeListImporter {
    /// 创建导入器
    pub fn new(source: NodeId, sink: NodeId) -> Self {
        Self {
            source,
            sink,
            node_count: None,
        }
    }

    /// 指定节点数；不指定时取最大节点 ID + 1
    pub fn with_node_count(mut self, node_count: usize) -> Self {
        self.node_count = Some(node_count);
        self
    }

    /// 从 CSV 导入（表头 `from,to,capacity`）
    pub fn import_csv<P: AsRef<Path>>(&self, path: P) -> Result<(FlowNetwork, ImportStats)> {
        let file = File::open(path)?;
        self.read_csv(file)
    }

    /// 从任意读取器解析 CSV
    pub fn read_csv<R: Read>(&self, reader: R) -> Result<(FlowNetwork, ImportStats)> {
        let start = std::time::Instant::now();
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .comment(Some(b'#'))
            .from_reader(reader);

        let mut stats = ImportStats::default();
        let mut records = Vec::new();
        for (line, row) in csv_reader.deserialize::<CsvEdgeRecord>().enumerate() {
            let parsed = row
                .map_err(Error::from)
                .and_then(|r| Ok((r.from, r.to, parse_capacity(&r.capacity)?)));
            match parsed {
                Ok(edge) => records.push(edge),
                Err(e) => {
                    warn!(line = line + 2, error = %e, "跳过无效的边记录");
                    stats.errors += 1;
                }
            }
        }

        let network = self.build(&records, &mut stats)?;
        stats.duration_ms = start.elapsed().as_millis() as u64;
        Ok((network, stats))
    }

    /// 从 JSON Lines 导入（每行 `{"from":..,"to":..,"capacity":..}`）
    pub fn import_jsonl<P: AsRef<Path>>(&self, path: P) -> Result<(FlowNetwork, ImportStats)> {
        let start = std::time::Instant::now();
        let file = File::open(path)?;
        let reader = BufReader::new(file);

        let mut stats = ImportStats::default();
        let mut records = Vec::new();
        for (line_no, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let parsed = serde_json::from_str::<EdgeRecord>(&line)
                .map_err(|e| Error::ImportError(format!("JSON 解析错误: {}", e)))
                .and_then(Self::resolve);
            match parsed {
                Ok(edge) => records.push(edge),
                Err(e) => {
                    warn!(line = line_no + 1, error = %e, "跳过无效的边记录");
                    stats.errors += 1;
                }
            }
        }

        let network = self.build(&records, &mut stats)?;
        stats.duration_ms = start.elapsed().as_millis() as u64;
        Ok((network, stats))
    }

    fn resolve(record: EdgeRecord) -> Result<(NodeId, NodeId, Capacity)> {
        Ok((record.from, record.to, record.capacity.resolve()?))
    }

    fn build(
        &self,
        records: &[(NodeId, NodeId, Capacity)],
        stats: &mut ImportStats,
    ) -> Result<FlowNetwork> {
        let node_count = match self.node_count {
            Some(n) => n,
            None => records
                .iter()
                .flat_map(|&(u, v, _)| [u, v])
                .chain([self.source, self.sink])
                .max()
                .map_or(0, |m| m + 1),
        };

        let mut network =
            FlowNetwork::new(node_count, self.source, self.sink)?.with_edge_capacity(records.len());
        for &(u, v, c) in records {
            network.add_edge(u, v, c)?;
            stats.edges_imported += 1;
        }
        stats.nodes = node_count;

        debug!(
            nodes = node_count,
            edges = stats.edges_imported,
            errors = stats.errors,
            "边列表导入完成"
        );
        Ok(network)
    }
}

/// 分割请求（JSON 格式）
///
/// `pixels` 为灰度强度，`rgb` 为 `0xRRGGBB` 打包像素，二者给出其一即可。
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SegmentationRequest {
    pub width: usize,
    pub height: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pixels: Option<Vec<u8>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rgb: Option<Vec<u32>>,
    #[serde(default)]
    pub object_seeds: Vec<PixelSeed>,
    #[serde(default)]
    pub background_seeds: Vec<PixelSeed>,
}

impl SegmentationRequest {
    /// 从 JSON 文件读取
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        serde_json::from_reader(BufReader::new(file))
            .map_err(|e| Error::ParseError(format!("分割请求解析错误: {}", e)))
    }

    /// 构造灰度图像
    pub fn image(&self) -> Result<GrayImage> {
        match (&self.pixels, &self.rgb) {
            (Some(pixels), _) => GrayImage::new(self.width, self.height, pixels.clone()),
            (None, Some(rgb)) => GrayImage::from_rgb(self.width, self.height, rgb),
            (None, None) => Err(Error::InvalidImage(
                "分割请求缺少 pixels 或 rgb 字段".to_string(),
            )),
        }
    }
}

/// 无穷容量在导出时写作 `inf`
pub fn format_capacity(capacity: Capacity) -> String {
    if capacity == INFINITE_CAPACITY {
        "inf".to_string()
    } else {
        capacity.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithm::{EdmondsKarpSolver, MaxFlowSolver};
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_import_csv() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "from,to,capacity").unwrap();
        writeln!(file, "5,0,10").unwrap();
        writeln!(file, "5, 1, 10").unwrap();
        writeln!(file, "# 汇点边").unwrap();
        writeln!(file, "2,4,10").unwrap();
        writeln!(file, "3,4,10").unwrap();
        writeln!(file, "0,1,2").unwrap();
        writeln!(file, "0,2,4").unwrap();
        writeln!(file, "0,3,8").unwrap();
        writeln!(file, "1,3,9").unwrap();
        writeln!(file, "3,2,6").unwrap();
        writeln!(file, "3,x,6").unwrap();

        let (network, stats) = EdgeListImporter::new(5, 4).import_csv(file.path()).unwrap();
        assert_eq!(stats.nodes, 6);
        assert_eq!(stats.edges_imported, 9);
        assert_eq!(stats.errors, 1);

        let mut solver = EdmondsKarpSolver::new(network);
        assert_eq!(solver.max_flow(), 19);
    }

    #[test]
    fn test_import_csv_infinite_and_negative() {
        let csv = "from,to,capacity\n0,1,inf\n1,2,7\n";
        let (network, _) = EdgeListImporter::new(0, 2)
            .with_node_count(4)
            .read_csv(csv.as_bytes())
            .unwrap();
        assert_eq!(network.node_count(), 4);
        assert_eq!(network.forward_edges().next().unwrap().1.capacity(), INFINITE_CAPACITY);

        let csv = "from,to,capacity\n0,1,-3\n";
        let err = EdgeListImporter::new(0, 1).read_csv(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, Error::InvalidCapacity { capacity: -3, .. }));
    }

    #[test]
    fn test_import_jsonl() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, r#"{{"from":0,"to":1,"capacity":5}}"#).unwrap();
        writeln!(file, r#"{{"from":1,"to":2,"capacity":"inf"}}"#).unwrap();
        writeln!(file).unwrap();
        writeln!(file, r#"{{"from":1}}"#).unwrap();

        let (network, stats) = EdgeListImporter::new(0, 2).import_jsonl(file.path()).unwrap();
        assert_eq!(stats.edges_imported, 2);
        assert_eq!(stats.errors, 1);
        assert_eq!(network.node_count(), 3);
    }

    #[test]
    fn test_segmentation_request() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"width":2,"height":1,"rgb":[16777215,0],"object_seeds":[{{"row":0,"col":0}}]}}"#
        )
        .unwrap();

        let request = SegmentationRequest::from_file(file.path()).unwrap();
        let image = request.image().unwrap();
        assert_eq!(image.pixels(), &[255, 0]);
        assert_eq!(request.object_seeds, vec![PixelSeed::new(0, 0)]);
        assert!(request.background_seeds.is_empty());

        let empty = SegmentationRequest {
            width: 1,
            height: 1,
            ..Default::default()
        };
        assert!(matches!(empty.image(), Err(Error::InvalidImage(_))));
    }

    #[test]
    fn test_format_capacity() {
        assert_eq!(format_capacity(INFINITE_CAPACITY), "inf");
        assert_eq!(format_capacity(12), "12");
    }
}
